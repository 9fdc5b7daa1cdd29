//! Diesel ORM models for database tables.

use diesel::prelude::*;

use crate::schema;

/// Receipt file record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::receipt_files)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReceiptFileRecord {
    pub id: i32,
    pub file_name: String,
    pub file_path: String,
    pub is_valid: bool,
    pub invalid_reason: Option<String>,
    pub is_processed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// New receipt file for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::receipt_files)]
pub struct NewReceiptFile<'a> {
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub is_valid: bool,
    pub invalid_reason: Option<&'a str>,
    pub is_processed: bool,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Receipt record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::receipts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReceiptRecord {
    pub id: i32,
    pub file_path: String,
    pub merchant_name: Option<String>,
    pub total_amount: Option<f64>,
    pub purchased_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// New receipt for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::receipts)]
pub struct NewReceipt<'a> {
    pub file_path: &'a str,
    pub merchant_name: Option<&'a str>,
    pub total_amount: Option<f64>,
    pub purchased_at: Option<&'a str>,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}
