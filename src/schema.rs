table! {
    users (id) {
        id -> Integer,
        username -> Text,
        password -> Text,
        name -> Text,
        email -> Text,
        role -> Text,
        created_at -> Timestamp,
    }
}

table! {
    user_logins (token) {
        token -> Text,
        user_id -> Integer,
        login_time -> Timestamp,
    }
}

table! {
    appointments (id) {
        id -> Integer,
        user_id -> Integer,
        reason -> Text,
        scheduled_date -> Date,
        scheduled_time -> Text,
        concern_category -> Text,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    student_records (user_id) {
        user_id -> Integer,
        personal_info -> Text,
        family_background -> Text,
        education -> Text,
        health -> Text,
        enrollment_reasons -> Text,
        completed -> Bool,
        updated_at -> Timestamp,
    }
}

joinable!(user_logins -> users (user_id));
joinable!(appointments -> users (user_id));
joinable!(student_records -> users (user_id));

allow_tables_to_appear_in_same_query!(appointments, student_records, user_logins, users,);
