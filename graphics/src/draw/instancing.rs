//! Instanced draw strategies.

use crate::backend::Capabilities;

/// How instanced draws reach the context, chosen once from its capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstancingStrategy {
    /// Instance transforms are vertex attributes with divisor 1.
    VertexDivisor,
    /// Instanced draws of bounded size with transforms pushed as uniforms.
    UniformBatches,
    /// One draw per instance with its transform pushed as uniforms.
    PerInstance,
}

impl InstancingStrategy {
    /// Pick the best strategy the context supports.
    pub fn select(capabilities: &Capabilities) -> Self {
        if capabilities.instanced_arrays {
            Self::VertexDivisor
        } else {
            Self::uniform_fallback(capabilities)
        }
    }

    /// Strategy used when instance data cannot come from vertex attributes.
    pub fn uniform_fallback(capabilities: &Capabilities) -> Self {
        if capabilities.draw_instanced {
            Self::UniformBatches
        } else {
            Self::PerInstance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_tiers() {
        assert_eq!(
            InstancingStrategy::select(&Capabilities::all()),
            InstancingStrategy::VertexDivisor
        );
        assert_eq!(
            InstancingStrategy::select(&Capabilities::minimal().with_draw_instanced(true)),
            InstancingStrategy::UniformBatches
        );
        assert_eq!(
            InstancingStrategy::select(&Capabilities::minimal()),
            InstancingStrategy::PerInstance
        );
    }

    #[test]
    fn test_fallback_never_uses_divisors() {
        assert_eq!(
            InstancingStrategy::uniform_fallback(&Capabilities::all()),
            InstancingStrategy::UniformBatches
        );
    }
}
