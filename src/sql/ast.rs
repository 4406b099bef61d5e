use crate::types::value::DataType;

/// One parsed SQL statement, as handed to the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    DropTable(DropTable),
    DropIndex(DropIndex),
    ShowTables,
    ShowColumns { table: String },
    ShowIndex { table: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub if_not_exists: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub index: String,
    pub table: String,
    pub columns: Vec<String>,
    /// Uppercased index method; `BTREE` unless `USING` says otherwise.
    pub index_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTable {
    pub table: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropIndex {
    pub index: String,
    pub table: String,
}
