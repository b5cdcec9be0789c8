use crate::error::CliResult;
use chrono::NaiveDate;
use profile_rollup_core::{DateBasis, DocumentKind, ObjectKey};

pub fn run(kind: DocumentKind, date: Option<NaiveDate>, basis: DateBasis) -> CliResult<()> {
    let date = date.unwrap_or_else(|| basis.today());
    println!("{}", ObjectKey::for_date(date, kind));
    Ok(())
}
