use penprint_core::aggregator::ConfusionMatrix;
use penprint_core::models::LabelScore;

/// Renders the matrix as a bordered grid with the true labels as both row and
/// column headers and an empty top-left cell.
pub fn render_grid(matrix: &ConfusionMatrix) -> String {
    let labels = matrix.labels();
    let grid = matrix.grid();

    let mut header = vec![String::new()];
    header.extend(labels.iter().cloned());

    let rows = labels
        .iter()
        .zip(grid)
        .map(|(label, counts)| {
            let mut row = vec![label.clone()];
            row.extend(counts.iter().map(u64::to_string));
            row
        })
        .collect::<Vec<_>>();

    render_table(&header, &rows)
}

pub fn render_scores(scores: &[LabelScore], chosen: &str) -> String {
    let header = vec![
        "reference".to_string(),
        "delta".to_string(),
        String::new(),
    ];
    let rows = scores
        .iter()
        .map(|score| {
            vec![
                score.label.clone(),
                score.delta.to_string(),
                if score.label == chosen { "<" } else { "" }.to_string(),
            ]
        })
        .collect::<Vec<_>>();

    render_table(&header, &rows)
}

/// First column left-aligned, remaining columns right-aligned.
fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let widths = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let rule = |fill: char| {
        let mut line = String::from("+");
        for width in &widths {
            line.extend(std::iter::repeat_n(fill, width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };
    let line = |cells: &[String]| {
        let mut out = String::from("|");
        for (col, (cell, width)) in cells.iter().zip(&widths).enumerate() {
            if col == 0 {
                out.push_str(&format!(" {cell:<width$} |"));
            } else {
                out.push_str(&format!(" {cell:>width$} |"));
            }
        }
        out.push('\n');
        out
    };

    let mut out = rule('-');
    out.push_str(&line(header));
    out.push_str(&rule('='));
    for row in rows {
        out.push_str(&line(row));
        out.push_str(&rule('-'));
    }
    out
}
