use bitflags::bitflags;

/// One shader compilation unit within a multi-stage program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

impl ShaderStage {
    /// Number of stages in [`ShaderStage::ALL`].
    pub const COUNT: usize = 6;

    /// Fixed enumeration order used whenever a program's stages are consolidated.
    ///
    /// Consolidation walks stages in this order, so the first stage to declare a
    /// buffer or resource decides which definition later stages are validated
    /// against. Keeping the order fixed keeps diagnostics deterministic.
    pub const ALL: [ShaderStage; Self::COUNT] = [
        ShaderStage::Vertex,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Geometry,
        ShaderStage::Pixel,
        ShaderStage::Compute,
    ];

    pub fn index(self) -> usize {
        match self {
            ShaderStage::Vertex => 0,
            ShaderStage::Hull => 1,
            ShaderStage::Domain => 2,
            ShaderStage::Geometry => 3,
            ShaderStage::Pixel => 4,
            ShaderStage::Compute => 5,
        }
    }

    /// The stage's bit in a [`StageFlags`] usage mask.
    pub fn flag(self) -> StageFlags {
        match self {
            ShaderStage::Vertex => StageFlags::VERTEX,
            ShaderStage::Hull => StageFlags::HULL,
            ShaderStage::Domain => StageFlags::DOMAIN,
            ShaderStage::Geometry => StageFlags::GEOMETRY,
            ShaderStage::Pixel => StageFlags::PIXEL,
            ShaderStage::Compute => StageFlags::COMPUTE,
        }
    }
}

bitflags! {
    /// Which stages of a program reference a given buffer or resource.
    ///
    /// Accumulated while a program's stages are consolidated; the final mask is
    /// the union of the stage bit of every stage that declared the entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StageFlags: u32 {
        const VERTEX = 1 << 0;
        const HULL = 1 << 1;
        const DOMAIN = 1 << 2;
        const GEOMETRY = 1 << 3;
        const PIXEL = 1 << 4;
        const COMPUTE = 1 << 5;
    }
}
