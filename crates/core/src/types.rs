/// Primary keys are SQLite `INTEGER PRIMARY KEY` rowids.
pub type DbId = i64;
