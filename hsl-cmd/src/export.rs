//! Text export of law tables.
//!
//! The format is a `q ;zav ;zam` header followed by one semicolon-delimited
//! row per sample, in table order.

use std::io::Write;

use hsl_core::law::LawSample;

pub const HEADER: [&str; 3] = ["q ", "zav ", "zam"];

/// Write `table` to `out`.
pub fn write_table<W: Write>(out: W, table: &[LawSample]) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(out);
    wtr.write_record(HEADER)?;
    for s in table {
        wtr.write_record(&[s.q.to_string(), s.zav.to_string(), s.zam.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
