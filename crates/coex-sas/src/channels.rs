//! Mapping colors to channel blocks.

use std::collections::BTreeSet;

use coex_ir::DeviceRegistry;
use tracing::{debug, info, instrument};

use crate::coloring::ColoredComponent;
use crate::error::{SasError, SasResult};

/// Channels for one color of a component with `chromatic` colors.
///
/// With `k = available.len() / chromatic`, color `c` gets the `c`-th block
/// of `k` channels. When there are more colors than channels, every color
/// gets nothing, unless `partial_assign` is set: then the first colors get
/// one channel each and the remaining ones nothing.
pub fn channel_block(
    color: u32,
    chromatic: usize,
    available: &[u32],
    partial_assign: bool,
) -> BTreeSet<u32> {
    if color == 0 || chromatic == 0 {
        return BTreeSet::new();
    }
    let index = color as usize - 1;

    if chromatic > available.len() {
        if partial_assign {
            return available.get(index).copied().into_iter().collect();
        }
        return BTreeSet::new();
    }

    let per_color = available.len() / chromatic;
    available
        .get(index * per_color..(index + 1) * per_color)
        .map(|block| block.iter().copied().collect())
        .unwrap_or_default()
}

/// Write colors and channel blocks of `components` onto the devices.
///
/// All members are checked before anything is written, so a failing call
/// leaves the registry untouched.
#[instrument(skip_all, fields(components = components.len(), channels = available.len()))]
pub fn assign_channels(
    registry: &mut DeviceRegistry,
    components: &[ColoredComponent],
    available: &[u32],
    partial_assign: bool,
) -> SasResult<()> {
    if available.is_empty() {
        return Err(SasError::Configuration(
            "no channels available for assignment".to_string(),
        ));
    }
    for component in components {
        if let Some(id) = component.colors.keys().find(|id| !registry.contains(id)) {
            return Err(SasError::InconsistentState(format!(
                "colored device '{id}' is not in the registry"
            )));
        }
    }

    let mut silenced = 0;
    for component in components {
        for (id, &color) in &component.colors {
            let channels = channel_block(color, component.chromatic, available, partial_assign);
            if channels.is_empty() {
                silenced += 1;
            }
            let device = registry.require_mut(id, "channel assignment")?;
            device.color = color;
            device.channels = channels;
        }
        debug!(
            "Assigned {} devices with chromatic {}",
            component.len(),
            component.chromatic
        );
    }

    info!(
        "Assigned channels to {} components, {} devices without channels",
        components.len(),
        silenced
    );
    Ok(())
}
