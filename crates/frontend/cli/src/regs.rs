//! JSON register file
//!
//! Every field is optional; missing registers keep their post-boot value.
//!
//! ```json
//! { "lcdc": 145, "bgp": 228, "scx": 4, "wx": 87 }
//! ```

use emu_gb::{GbBus, LcdReg};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterFile {
    pub lcdc: Option<u8>,
    pub stat: Option<u8>,
    pub scy: Option<u8>,
    pub scx: Option<u8>,
    pub lyc: Option<u8>,
    pub bgp: Option<u8>,
    pub obp0: Option<u8>,
    pub obp1: Option<u8>,
    pub wy: Option<u8>,
    pub wx: Option<u8>,
}

impl RegisterFile {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn entries(&self) -> [(LcdReg, Option<u8>); 10] {
        [
            (LcdReg::Lcdc, self.lcdc),
            (LcdReg::Stat, self.stat),
            (LcdReg::Scy, self.scy),
            (LcdReg::Scx, self.scx),
            (LcdReg::Lyc, self.lyc),
            (LcdReg::Bgp, self.bgp),
            (LcdReg::Obp0, self.obp0),
            (LcdReg::Obp1, self.obp1),
            (LcdReg::Wy, self.wy),
            (LcdReg::Wx, self.wx),
        ]
    }

    /// Write the present registers through the CPU-side port
    pub fn apply(&self, bus: &mut GbBus) -> usize {
        let mut written = 0;
        for (reg, val) in self.entries() {
            if let Some(val) = val {
                bus.write(reg.address(), val);
                written += 1;
            }
        }
        written
    }
}
