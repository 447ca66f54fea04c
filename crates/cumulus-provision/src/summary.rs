//! End-of-run summary

use cumulus_cloud::Instance;
use cumulus_config::DnsRecordPair;

/// Everything the operator needs to know about a completed run.
#[derive(Debug, Clone)]
pub struct ProvisionSummary {
    pub instance: Instance,
    pub records: Option<DnsRecordPair>,
    /// Finalized user data payload, kept for `--show-parsed-template`.
    pub user_data: String,
}

impl std::fmt::Display for ProvisionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "# instance summary:")?;
        writeln!(f, "id:               {}", self.instance.id)?;

        if let Some(public_ip) = &self.instance.public_ip {
            writeln!(f, "public ip:        {public_ip}")?;
        }
        if let Some(private_ip) = &self.instance.private_ip {
            writeln!(f, "private ip:       {private_ip}")?;
        }
        if let Some(name) = &self.instance.public_dns_name {
            writeln!(f, "public aws fqdn:  {name}")?;
        }
        if let Some(name) = &self.instance.private_dns_name {
            writeln!(f, "private aws fqdn: {name}")?;
        }

        if let Some(records) = &self.records {
            // Only report aliases that were actually pointed at something; a
            // VPC instance may have no public address.
            if records.public.target().is_some() {
                writeln!(f, "public fqdn:      {}", records.public.alias())?;
            }
            if records.private.target().is_some() {
                writeln!(f, "private fqdn:     {}", records.private.alias())?;
            }
        }

        if let Some(address) = self.instance.public_address() {
            writeln!(f)?;
            writeln!(f, "# connect:")?;
            writeln!(f, "ssh {address} -l ubuntu")?;
        }

        Ok(())
    }
}
