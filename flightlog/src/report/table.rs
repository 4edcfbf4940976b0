//! Fixed-width column layout of the OFP log table.

/// Column widths: POSITION/IDENT, LAT/LONG, ET/ATO, FL/DIS/RDIS, MN/TAS/GS, OAT, AFOB/ABRN.
pub const COLUMN_WIDTHS: [usize; 7] = [14, 9, 4, 4, 4, 3, 4];

/// The three header rows of the table.
pub const HEADER_ROWS: [[&str; 7]; 3] = [
    ["", "", "", "FL", "MN", "OAT", "AFOB"],
    ["POSITION", "LAT", "ET", "DIS", "TAS", "", ""],
    ["IDENT", "LONG", "ATO", "RDIS", "GS", "", "ABRN"],
];

/// Lays out one table row.
///
/// The first cell is left-aligned, the rest right-aligned, separated by a
/// single space. Cells wider than their column are not truncated.
pub fn format_row<S: AsRef<str>>(cells: &[S; 7]) -> String {
    let mut row = String::with_capacity(COLUMN_WIDTHS.iter().sum::<usize>() + 6);

    for (index, (cell, width)) in cells.iter().zip(COLUMN_WIDTHS).enumerate() {
        let cell = cell.as_ref();
        if index == 0 {
            row.push_str(&format!("{:<width$}", cell, width = width));
        } else {
            row.push(' ');
            row.push_str(&format!("{:>width$}", cell, width = width));
        }
    }

    row
}
