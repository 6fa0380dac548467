//! `evict policy show`.

use super::Services;
use crate::error::Result;

/// Print the stored policy document and when it was last published.
pub fn cmd_policy_show(services: &Services) -> Result<()> {
    let publisher = services.publisher();

    let Some(stored) = publisher.load()? else {
        println!(
            "Policy '{}' has not been published yet. Run `evict sync`.",
            services.config.policy_id
        );
        return Ok(());
    };

    println!("Policy:      {} ({})", stored.name, stored.id);
    println!("Description: {}", stored.description);
    println!("Updated:     {}", stored.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    println!("{}", stored.content);

    Ok(())
}
