//! Per-engine invocation and provisioning shapes.

use super::process::Invocation;
use super::EngineTarget;

/// Default database used by bendsql for connections made before the target
/// database exists.
pub const DEFAULT_BOOTSTRAP_DATABASE: &str = "default";

/// Default snowsql schema.
pub const DEFAULT_SCHEMA: &str = "PUBLIC";

/// One statement issued while resetting a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionStep {
    pub statement: String,
    /// Where the statement is sent, which may differ from the database being reset.
    pub target: EngineTarget,
    /// Failures of this step are logged and swallowed.
    pub tolerate_failure: bool,
}

/// Everything an engine needs to take a database back to an empty state.
pub type ProvisionPlan = Vec<ProvisionStep>;

/// The engine-specific parts of driving a query engine client.
pub trait EngineDialect: Send + Sync {
    /// Short engine name used in logs and reports.
    fn name(&self) -> &str;

    /// Fixture subdirectory holding this engine's `setup.sql`.
    fn setup_dir(&self) -> &str;

    /// Shapes the client command line for one statement.
    fn invocation(&self, statement: &str, target: &EngineTarget) -> Invocation;

    /// Statements that drop and recreate `target.database`.
    fn provision_plan(&self, target: &EngineTarget) -> ProvisionPlan;
}

/// The embedded engine, driven through `bendsql`.
///
/// bendsql has no usable `IF EXISTS` on database drops, so provisioning goes
/// through a bootstrap database and tolerates a failing drop.
#[derive(Debug, Clone)]
pub struct BendSql {
    pub bootstrap_database: String,
}

impl Default for BendSql {
    fn default() -> Self {
        Self {
            bootstrap_database: DEFAULT_BOOTSTRAP_DATABASE.to_string(),
        }
    }
}

impl EngineDialect for BendSql {
    fn name(&self) -> &str {
        "bendsql"
    }

    fn setup_dir(&self) -> &str {
        "bend"
    }

    fn invocation(&self, statement: &str, target: &EngineTarget) -> Invocation {
        Invocation::new(&target.program)
            .arg(format!("--query={statement}"))
            .args(["-D", target.database.as_str()])
    }

    fn provision_plan(&self, target: &EngineTarget) -> ProvisionPlan {
        let bootstrap = target.with_database(&self.bootstrap_database);
        vec![
            ProvisionStep {
                statement: format!("DROP DATABASE {}", target.database),
                target: bootstrap.clone(),
                tolerate_failure: true,
            },
            ProvisionStep {
                statement: format!("CREATE DATABASE {}", target.database),
                target: bootstrap,
                tolerate_failure: false,
            },
        ]
    }
}

/// The warehouse-based engine, driven through `snowsql`.
///
/// Output is forced to header-less TSV without timing or friendly messages so
/// that stdout carries only rows.
#[derive(Debug, Clone)]
pub struct SnowSql {
    pub schema: String,
}

impl Default for SnowSql {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
        }
    }
}

impl EngineDialect for SnowSql {
    fn name(&self) -> &str {
        "snowsql"
    }

    fn setup_dir(&self) -> &str {
        "snow"
    }

    fn invocation(&self, statement: &str, target: &EngineTarget) -> Invocation {
        let invocation = Invocation::new(&target.program)
            .args(["--query", statement])
            .args(["--dbname", target.database.as_str()])
            .args(["--schemaname", self.schema.as_str()])
            .args(["-o", "output_format=tsv"])
            .args(["-o", "header=false"])
            .args(["-o", "timing=false"])
            .args(["-o", "friendly=false"]);

        match &target.warehouse {
            Some(warehouse) => invocation.args(["--warehouse", warehouse.as_str()]),
            None => invocation,
        }
    }

    fn provision_plan(&self, target: &EngineTarget) -> ProvisionPlan {
        vec![
            ProvisionStep {
                statement: format!("DROP DATABASE IF EXISTS {}", target.database),
                target: target.clone(),
                tolerate_failure: false,
            },
            ProvisionStep {
                statement: format!("CREATE DATABASE {}", target.database),
                target: target.clone(),
                tolerate_failure: false,
            },
        ]
    }
}
