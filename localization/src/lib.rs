mod error;
mod phase;
mod projection;

pub use error::LocalizationError;
pub use phase::*;
pub use projection::*;

use control::Control;
use wavepacket::WavepacketList;

/// Localization scheme selected by the `localization` control key.
#[derive(Debug, Clone, PartialEq)]
pub enum Localization {
    Phase(LocalizationMethod),
    Projection(SiteProjection),
}

impl Localization {
    pub fn from_control(control: &Control) -> Result<Localization, LocalizationError> {
        match control.get_localization() {
            "projection" => {
                let sites = control.get_projection_sites().to_vec();
                if sites.is_empty() {
                    return Err(LocalizationError::NoTrialSites);
                }
                Ok(Localization::Projection(SiteProjection::new(sites)))
            }
            _ => Ok(Localization::Phase(LocalizationMethod::from_control(control)?)),
        }
    }

    pub fn apply(&self, list: &WavepacketList) -> Result<WavepacketList, LocalizationError> {
        match self {
            Localization::Phase(method) => localize_wavepacket_list(list, method),
            Localization::Projection(sites) => localize_wavepacket_projection(list, sites),
        }
    }
}
