/// Why a node is still holding a bundle.
///
/// Lifecycle rules belong to the store and forwarder; this only names the states.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    DispatchPending,
    ForwardPending,
    ReassemblyPending,
    /// Implementation-specific hold, carried without interpretation
    Contraindicated,
}

impl core::fmt::Display for Constraint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Constraint::DispatchPending => "dispatch pending",
            Constraint::ForwardPending => "forwarding pending",
            Constraint::ReassemblyPending => "reassembly pending",
            Constraint::Contraindicated => "contraindicated",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Constraint::DispatchPending.to_string(), "dispatch pending");
        assert_eq!(Constraint::ForwardPending.to_string(), "forwarding pending");
        assert_eq!(
            Constraint::ReassemblyPending.to_string(),
            "reassembly pending"
        );
        assert_eq!(Constraint::Contraindicated.to_string(), "contraindicated");
    }
}
