//! Static routing table onto the command bus.
//!
//! The table is intentionally small: only operations the gateway is
//! meant to expose are routable, so an unlisted pair fails here even
//! after passing the safety gate.

use super::{CommandLink, CommandLinkError, RoutedCommand};

const ROUTES: &[(&str, u16, &[(&str, u8)])] = &[
    ("CFE_ES", 0x1806, &[("NOOP", 0), ("RESET_COUNTERS", 1)]),
    ("FM", 0x188C, &[("GET_DIR_LIST", 2)]),
];

/// Command link over the static route table.
#[derive(Debug, Default)]
pub struct BusCommandLink {
    sent: u64,
}

impl BusCommandLink {
    /// Commands routed since startup.
    #[must_use]
    pub const fn sent(&self) -> u64 {
        self.sent
    }
}

impl CommandLink for BusCommandLink {
    fn send(&mut self, target: &str, operation: &str) -> Result<RoutedCommand, CommandLinkError> {
        let (_, message_id, operations) = ROUTES
            .iter()
            .find(|(name, _, _)| *name == target)
            .ok_or_else(|| CommandLinkError::UnknownTarget(target.to_owned()))?;

        let (_, command_code) = operations
            .iter()
            .find(|(name, _)| *name == operation)
            .ok_or_else(|| CommandLinkError::Unroutable {
                target: target.to_owned(),
                operation: operation.to_owned(),
            })?;

        self.sent += 1;
        Ok(RoutedCommand {
            message_id: *message_id,
            command_code: *command_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("CFE_ES", "NOOP", 0x1806, 0)]
    #[case("CFE_ES", "RESET_COUNTERS", 0x1806, 1)]
    #[case("FM", "GET_DIR_LIST", 0x188C, 2)]
    fn routes_listed_pairs(
        #[case] target: &str,
        #[case] operation: &str,
        #[case] message_id: u16,
        #[case] command_code: u8,
    ) {
        let mut link = BusCommandLink::default();
        assert_eq!(
            link.send(target, operation),
            Ok(RoutedCommand {
                message_id,
                command_code,
            })
        );
        assert_eq!(link.sent(), 1);
    }

    #[test]
    fn unknown_target_and_operation_are_distinct_errors() {
        let mut link = BusCommandLink::default();
        assert_eq!(
            link.send("TO_LAB", "NOOP"),
            Err(CommandLinkError::UnknownTarget("TO_LAB".into()))
        );
        assert_eq!(
            link.send("CFE_ES", "SELF_DESTRUCT"),
            Err(CommandLinkError::Unroutable {
                target: "CFE_ES".into(),
                operation: "SELF_DESTRUCT".into(),
            })
        );
        assert_eq!(link.sent(), 0);
    }
}
