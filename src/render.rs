use std::fmt::Write;

use crate::aggregator::Snapshot;

/// Formats counts as an object literal:
///
/// ```text
/// {
/// "01/Jan/2024,/home" : 2
/// ,"Jan/2024,/home" : 2
/// }
/// ```
///
/// Entries follow the snapshot's hash-map order, which is unspecified and may
/// differ between runs. Keys are written verbatim.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::from("{\n");
    for (index, (key, count)) in snapshot.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        // Writing into a String cannot fail.
        let _ = writeln!(out, "\"{}\" : {}", key, count);
    }
    out.push_str("}\n");
    out
}
