// Diesel table definitions, kept in sync with repository::context::init_schema.

diesel::table! {
    receipt_files (id) {
        id -> Integer,
        file_name -> Text,
        file_path -> Text,
        is_valid -> Bool,
        invalid_reason -> Nullable<Text>,
        is_processed -> Bool,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    receipts (id) {
        id -> Integer,
        file_path -> Text,
        merchant_name -> Nullable<Text>,
        total_amount -> Nullable<Double>,
        purchased_at -> Nullable<Text>,
        created_at -> Text,
        updated_at -> Text,
    }
}
