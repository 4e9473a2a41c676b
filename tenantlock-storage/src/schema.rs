//! Table definitions.
//!
//! Every statement is idempotent so the schema can be applied on each open.

pub(crate) const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS tenants (
        tenant_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'blocked')),
        subdomain TEXT COLLATE NOCASE UNIQUE,
        custom_domain TEXT COLLATE NOCASE UNIQUE,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS licenses (
        license_id TEXT PRIMARY KEY,
        key TEXT NOT NULL UNIQUE,
        tenant_id TEXT NOT NULL,
        plan_type TEXT NOT NULL,
        machine_hash TEXT,
        status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'revoked')),
        valid_from TEXT NOT NULL,
        valid_until TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_licenses_tenant ON licenses (tenant_id);

    CREATE TABLE IF NOT EXISTS platform_config (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";
