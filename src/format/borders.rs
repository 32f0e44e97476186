use crate::docx::Element;
use crate::docx::wml::{TCPR_ORDER, TableCell};

const EDGES: [&str; 4] = ["w:top", "w:left", "w:bottom", "w:right"];

/// Single 1/2 pt line on every edge.
fn cell_borders() -> Element {
    EDGES.iter().fold(Element::new("w:tcBorders"), |borders, edge| {
        borders.with_child(
            Element::new(*edge)
                .with_attr("w:val", "single")
                .with_attr("w:sz", "4")
                .with_attr("w:space", "0")
                .with_attr("w:color", "auto"),
        )
    })
}

/// Adds a four-edge border descriptor to the cell properties. Each call adds another
/// one; the table stage calls it once per cell.
pub fn apply_cell_borders(cell: &mut TableCell<'_>) {
    cell.properties().insert_ordered(cell_borders(), TCPR_ORDER);
}
