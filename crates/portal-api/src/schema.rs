use portal_core::migrations::MigrationStep;

/// Additive schema steps, run best-effort against every replication target
/// at startup. Each statement must be safe to re-run and must never drop or
/// rewrite what an earlier version created.
pub const MIGRATION_STEPS: &[MigrationStep] = &[
    MigrationStep {
        name: "create_school_profiles",
        sql: r#"
            CREATE TABLE IF NOT EXISTS school_profiles (
                school_id TEXT PRIMARY KEY,
                school_name TEXT NOT NULL,
                region TEXT,
                division TEXT,
                district TEXT,
                province TEXT,
                municipality TEXT,
                barangay TEXT,
                latitude NUMERIC(10, 7),
                longitude NUMERIC(10, 7),
                submitted_by TEXT,
                submitted_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP,
                history_logs JSONB DEFAULT '[]'::jsonb
            )
        "#,
    },
    MigrationStep {
        name: "add_school_profile_enrolment_columns",
        sql: r#"
            ALTER TABLE school_profiles
            ADD COLUMN IF NOT EXISTS curricular_offering TEXT,
            ADD COLUMN IF NOT EXISTS es_enrollment INTEGER DEFAULT 0,
            ADD COLUMN IF NOT EXISTS jhs_enrollment INTEGER DEFAULT 0,
            ADD COLUMN IF NOT EXISTS shs_enrollment INTEGER DEFAULT 0,
            ADD COLUMN IF NOT EXISTS total_enrollment INTEGER DEFAULT 0
        "#,
    },
    MigrationStep {
        name: "create_school_heads",
        sql: r#"
            CREATE TABLE IF NOT EXISTS school_heads (
                user_uid TEXT PRIMARY KEY,
                last_name TEXT,
                first_name TEXT,
                middle_name TEXT,
                item_number TEXT,
                position_title TEXT,
                date_hired TEXT,
                updated_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
            )
        "#,
    },
    MigrationStep {
        name: "create_facility_repairs",
        sql: r#"
            CREATE TABLE IF NOT EXISTS facility_repairs (
                entry_id TEXT PRIMARY KEY,
                school_id TEXT NOT NULL,
                description TEXT,
                severity TEXT,
                reported_by TEXT,
                created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
            )
        "#,
    },
    MigrationStep {
        name: "index_facility_repairs_school",
        sql: "CREATE INDEX IF NOT EXISTS idx_facility_repairs_school ON facility_repairs(school_id)",
    },
    MigrationStep {
        name: "create_activity_logs",
        sql: r#"
            CREATE TABLE IF NOT EXISTS activity_logs (
                id BIGSERIAL PRIMARY KEY,
                user_uid TEXT,
                action_type TEXT NOT NULL,
                target_entity TEXT NOT NULL,
                details TEXT,
                created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
            )
        "#,
    },
];
