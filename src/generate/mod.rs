pub mod header;

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use log::{debug, error, warn};

use crate::config::Config;
use crate::layout::{self, PeripheralMap};
use crate::naming::Namer;
use crate::svd::{Device, MaybeArray};
use crate::svd_adapter;
use crate::util;

pub use header::{Header, Instance};

/// Result of a whole device run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Generation {
    pub headers: Vec<Header>,
    /// Peripherals that were skipped, with the reason
    pub failed: Vec<(String, String)>,
}

/// Builds the layout of every peripheral of `device` and renders one header per output name.
///
/// Peripherals that share an output name (`TIMER_A0`, `TIMER_A1`, ..) share one header with
/// one base address constant each. A peripheral that fails is logged and skipped, unless
/// `config.fail_fast` is set.
pub fn render(device: &Device, config: &Config) -> Result<Generation> {
    let namer = Namer::new(&config.peripherals)?;
    let mut groups: Vec<(PeripheralMap, Vec<Instance>)> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut failed = Vec::new();

    for p in &device.peripherals {
        if let MaybeArray::Array(..) = p {
            warn!("Skipping peripheral array {}, not supported", p.name);
            continue;
        }
        let naming = namer.name(&p.name);

        let map = svd_adapter::raw_peripheral(p, device).and_then(|raw| {
            layout::build(&raw, &naming.name, &naming.strip)
                .with_context(|| format!("Error building layout of {}", p.name))
        });
        let map = match map {
            Ok(map) => map,
            Err(e) if config.fail_fast => return Err(e),
            Err(e) => {
                error!("Skipping peripheral {}: {:#}", p.name, e);
                failed.push((p.name.clone(), format!("{e:#}")));
                continue;
            }
        };

        let instance = Instance {
            name: p.name.clone(),
            base_address: p.base_address,
        };
        match by_name.get(&naming.name) {
            Some(&i) => {
                let (first, instances) = &mut groups[i];
                if first.layout.same_shape(&map.layout) {
                    debug!("{} shares the {} layout", p.name, naming.name);
                    instances.push(instance);
                } else {
                    let reason = format!(
                        "named {} like {}, but its layout differs",
                        naming.name, instances[0].name
                    );
                    if config.fail_fast {
                        bail!("{}: {}", p.name, reason);
                    }
                    warn!("Skipping peripheral {}: {}", p.name, reason);
                    failed.push((p.name.clone(), reason));
                }
            }
            None => {
                debug!(
                    "{} at {}: {} fields, {} bit-field groups",
                    p.name,
                    util::hex(p.base_address),
                    map.layout.fields.len(),
                    map.bitfields.len()
                );
                by_name.insert(naming.name.clone(), groups.len());
                groups.push((map, vec![instance]));
            }
        }
    }

    let headers = groups
        .iter()
        .map(|(map, instances)| header::render(map, instances))
        .collect::<Result<_>>()?;

    Ok(Generation { headers, failed })
}
