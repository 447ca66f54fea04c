use cumulus_cloud::CloudError;
use cumulus_config::ConfigError;
use cumulus_userdata::UserDataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    UserData(#[from] UserDataError),

    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error("DNS record already exists: {alias} (aborting before instance creation)")]
    DnsRecordConflict { alias: String },

    /// An error after instance creation succeeded. No rollback is attempted;
    /// the id is surfaced so an operator can clean up.
    #[error(
        "provisioning failed after instance {instance_id} was created; \
         the instance is still running and must be removed manually\ncause: {source}"
    )]
    OrphanedInstance {
        instance_id: String,
        #[source]
        source: Box<ProvisionError>,
    },
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
