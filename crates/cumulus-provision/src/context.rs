//! Immutable per-run context
//!
//! One value threaded through the whole pipeline instead of ambient state.
//! Identity and the DNS alias pair are resolved once, at construction.

use cumulus_config::{Config, DnsRecordPair, ResolvedIdentity, SectionMap};

#[derive(Debug, Clone)]
pub struct RunContext {
    pub verbose: bool,
    pub config: Config,
    pub identity: ResolvedIdentity,
    /// Alias pair to create, present only when hostname and domain resolved.
    pub records: Option<DnsRecordPair>,
    /// Raw `--user-data-template-variables` map, highest-precedence variable
    /// source for template rendering.
    pub template_variables_override: Option<SectionMap>,
}

impl RunContext {
    pub fn new(config: Config, verbose: bool) -> RunContext {
        let identity = ResolvedIdentity::resolve(&config);
        let records = DnsRecordPair::from_identity(&identity);

        RunContext {
            verbose,
            config,
            identity,
            records,
            template_variables_override: None,
        }
    }

    pub fn with_template_variables(mut self, variables: Option<SectionMap>) -> RunContext {
        self.template_variables_override = variables;
        self
    }

    /// Whether DNS record creation is planned for this run.
    pub fn dns_planned(&self) -> bool {
        self.records.is_some()
    }
}
