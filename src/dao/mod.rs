/// Score ledger trait and its file/memory backends.
pub mod ledger;
/// Question bank loading.
pub mod question_bank;
/// Storage error shared by file-backed collaborators.
pub mod storage;
