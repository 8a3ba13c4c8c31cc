//! Generator settings.

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Authentication table: no model and no generated seeder, the target
    /// project ships its own.
    pub auth_table: String,
    /// Tables whose seeders are written by hand. `DatabaseSeeder` calls them
    /// before every generated seeder.
    pub hand_seeded_tables: Vec<String>,
    /// Rows inserted by each generated seeder.
    pub seed_rows: usize,
    pub with_seeders: bool,
    /// Fail instead of falling back to raw identifiers for unresolved references.
    pub strict_references: bool,
    /// Fail when the foreign-key graph has a cycle.
    pub reject_cycles: bool,
    /// Swap in the output tree even when some files failed to write.
    pub allow_partial: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            auth_table: "users".to_string(),
            hand_seeded_tables: vec![
                "users".to_string(),
                "roles".to_string(),
                "estatus".to_string(),
                "status".to_string(),
            ],
            seed_rows: 10,
            with_seeders: true,
            strict_references: false,
            reject_cycles: false,
            allow_partial: false,
        }
    }
}

impl GeneratorConfig {
    pub fn is_auth_table(&self, table: &str) -> bool {
        table.eq_ignore_ascii_case(&self.auth_table)
    }

    pub fn is_hand_seeded(&self, table: &str) -> bool {
        self.is_auth_table(table)
            || self
                .hand_seeded_tables
                .iter()
                .any(|t| t.eq_ignore_ascii_case(table))
    }
}
