//! Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    /// Role hierarchy; seeded by the initial migration.
    roles (id) {
        id -> Int8,
        name -> Varchar,
        level -> Int4,
        description -> Text,
    }
}

diesel::table! {
    /// Accounts. `email` and `username` carry unique constraints
    /// `users_email_key` and `users_username_key`.
    users (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        password_hash -> Text,
        is_active -> Bool,
        role_id -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pending activation invitations, keyed by token hash.
    user_invitations (token_hash) {
        token_hash -> Varchar,
        user_id -> Int8,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(users -> roles (role_id));
diesel::joinable!(user_invitations -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(roles, users, user_invitations);
