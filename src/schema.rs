table! {
    accounts (id) {
        id -> Int8,
        user_id -> Int8,
        balance -> Numeric,
        currency -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    cards (id) {
        id -> Int8,
        account_id -> Int8,
        card_number -> Varchar,
        expiry_date -> Varchar,
        cvv_hash -> Varchar,
        integrity_tag -> Varchar,
        created_at -> Timestamptz,
    }
}

table! {
    credits (id) {
        id -> Int8,
        user_id -> Int8,
        principal -> Numeric,
        interest_rate -> Numeric,
        term_months -> Int4,
        created_at -> Timestamptz,
    }
}

table! {
    payment_schedules (id) {
        id -> Int8,
        credit_id -> Int8,
        due_date -> Date,
        amount -> Numeric,
        paid -> Bool,
        penalty -> Numeric,
        created_at -> Timestamptz,
    }
}

table! {
    transactions (id) {
        id -> Int8,
        account_id -> Int8,
        amount -> Numeric,
        kind -> Varchar,
        description -> Varchar,
        created_at -> Timestamptz,
    }
}

table! {
    users (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

joinable!(accounts -> users (user_id));
joinable!(cards -> accounts (account_id));
joinable!(credits -> users (user_id));
joinable!(payment_schedules -> credits (credit_id));
joinable!(transactions -> accounts (account_id));

allow_tables_to_appear_in_same_query!(
    accounts,
    cards,
    credits,
    payment_schedules,
    transactions,
    users,
);
