//! Restarting a batch of freshly placed units

use super::{ManagerError, UnitControl};
use crate::units::{Unit, UnitGroup};

/// Network units are inputs to networkd; restarting it picks them all up
pub const NETWORKD_SERVICE: &str = "systemd-networkd.service";

/// Split into (network, everything else), keeping relative order in each
pub fn split_network_units(units: &[Unit]) -> (Vec<&Unit>, Vec<&Unit>) {
    units.iter().partition(|u| u.group() == UnitGroup::Network)
}

/// Restart networkd once if any network units are present, then restart
/// every other unit by name. Stops at the first failure.
pub async fn activate<C: UnitControl>(control: &C, units: &[Unit]) -> Result<(), ManagerError> {
    let (network, others) = split_network_units(units);

    if !network.is_empty() {
        log::info!(
            "{} network unit(s) changed, restarting {}",
            network.len(),
            NETWORKD_SERVICE
        );
        control.restart_unit(NETWORKD_SERVICE).await?;
    }

    for unit in others {
        control.restart_unit(&unit.name).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_preserves_order() {
        let units = vec![
            Unit::new("b.service", ""),
            Unit::new("eth1.network", ""),
            Unit::new("a.service", ""),
            Unit::new("br0.netdev", ""),
        ];
        let (network, others) = split_network_units(&units);
        let network: Vec<_> = network.iter().map(|u| u.name.as_str()).collect();
        let others: Vec<_> = others.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(network, vec!["eth1.network", "br0.netdev"]);
        assert_eq!(others, vec!["b.service", "a.service"]);
    }
}
