//! Plain-text atom rendering for diagnostics.
//!
//! Output goes to the log only; stdout belongs to the transport.

use aot_core::{Atom, AtomType};

const CONFIDENCE_BAR_CELLS: usize = 20;

fn type_symbol(atom_type: AtomType) -> &'static str {
    match atom_type {
        AtomType::Premise => "🔍",
        AtomType::Reasoning => "🧠",
        AtomType::Hypothesis => "💡",
        AtomType::Verification => "✓",
        AtomType::Conclusion => "🏆",
    }
}

/// `Confidence: [████░░] 85%` with a fixed number of cells.
pub fn confidence_bar(confidence: f64) -> String {
    let filled = ((confidence.clamp(0.0, 1.0) * CONFIDENCE_BAR_CELLS as f64).round() as usize)
        .min(CONFIDENCE_BAR_CELLS);
    format!(
        "Confidence: [{}{}] {:.0}%",
        "█".repeat(filled),
        "░".repeat(CONFIDENCE_BAR_CELLS - filled),
        confidence * 100.0
    )
}

/// Boxed multi-line view of one atom.
pub fn format_atom(atom: &Atom, max_depth: f64) -> String {
    let depth = atom
        .depth
        .map(|depth| format!(" [Depth: {depth}/{max_depth}]"))
        .unwrap_or_default();
    let verified = if atom.is_verified { " (✓ Verified)" } else { "" };
    let header = format!(
        "{} {}: {}{depth}{verified}",
        type_symbol(atom.atom_type),
        atom.atom_type.as_str().to_uppercase(),
        atom.atom_id
    );
    let dependencies = if atom.dependencies.is_empty() {
        "No dependencies".to_string()
    } else {
        format!("Dependencies: {}", atom.dependencies.join(", "))
    };
    let bar = confidence_bar(atom.confidence);

    let lines = [header, atom.content.clone(), bar, dependencies];
    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let border = "─".repeat(width + 2);
    let row = |line: &str| format!("│ {line:<width$} │");

    [
        format!("┌{border}┐"),
        row(&lines[0]),
        format!("├{border}┤"),
        row(&lines[1]),
        row(&lines[2]),
        row(&lines[3]),
        format!("└{border}┘"),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{confidence_bar, format_atom};
    use aot_core::{Atom, AtomType};

    fn hypothesis() -> Atom {
        Atom {
            atom_id: "H1".to_string(),
            content: "the cache is stale".to_string(),
            atom_type: AtomType::Hypothesis,
            dependencies: vec!["P1".to_string(), "R1".to_string()],
            confidence: 0.85,
            created: 0,
            is_verified: true,
            depth: Some(2),
        }
    }

    #[test]
    fn confidence_bar_has_twenty_cells() {
        let bar = confidence_bar(0.85);
        assert_eq!(bar.matches('█').count(), 17);
        assert_eq!(bar.matches('░').count(), 3);
        assert!(bar.ends_with("85%"));

        let empty = confidence_bar(0.0);
        assert_eq!(empty.matches('░').count(), 20);
        assert!(empty.ends_with(" 0%"));
    }

    #[test]
    fn format_atom_renders_header_and_body() {
        let rendered = format_atom(&hypothesis(), 5.0);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 7);
        assert!(lines[1].contains("💡 HYPOTHESIS: H1 [Depth: 2/5] (✓ Verified)"));
        assert!(lines[3].contains("the cache is stale"));
        assert!(lines[5].contains("Dependencies: P1, R1"));
        assert!(lines[0].starts_with('┌') && lines[6].starts_with('└'));
    }

    #[test]
    fn format_atom_pads_rows_to_equal_width() {
        let mut atom = hypothesis();
        atom.dependencies.clear();
        atom.is_verified = false;
        let rendered = format_atom(&atom, 3.5);

        let widths: Vec<usize> = rendered.lines().map(|line| line.chars().count()).collect();
        assert!(widths.windows(2).all(|pair| pair[0] == pair[1]));
        assert!(rendered.contains("No dependencies"));
        assert!(rendered.contains("[Depth: 2/3.5]"));
        assert!(!rendered.contains("Verified"));
    }
}
