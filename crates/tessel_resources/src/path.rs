//! Path objects for path rendering.
//!
//! Paths are created in contiguous blocks and only hold their command stream
//! and stroke parameters. Nothing attaches to a path, so deletion is immediate.

use std::cell::{Cell, RefCell};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tessel_core::{Handle, RefCount, Resource, Result, TesselError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo,
    LineTo,
    QuadraticCurveTo,
    CubicCurveTo,
    ConicCurveTo,
    Close,
}

impl PathCommand {
    /// Number of coordinates the command consumes.
    #[must_use]
    pub const fn coord_count(self) -> usize {
        match self {
            Self::MoveTo | Self::LineTo => 2,
            Self::QuadraticCurveTo => 4,
            Self::CubicCurveTo => 6,
            Self::ConicCurveTo => 5,
            Self::Close => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndCap {
    #[default]
    Flat,
    Square,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JoinStyle {
    #[default]
    MiterRevert,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeParams {
    pub width: f32,
    pub miter_limit: f32,
    pub bound: f32,
    pub end_caps: EndCap,
    pub join_style: JoinStyle,
}

impl Default for StrokeParams {
    fn default() -> Self {
        Self {
            width: 1.0,
            miter_limit: 4.0,
            bound: 0.2,
            end_caps: EndCap::Flat,
            join_style: JoinStyle::MiterRevert,
        }
    }
}

#[derive(Debug, Default)]
struct PathData {
    commands: SmallVec<[PathCommand; 8]>,
    coords: Vec<f32>,
}

#[derive(Debug)]
pub struct Path {
    id: Handle,
    ref_count: RefCount,
    data: RefCell<PathData>,
    stroke: Cell<StrokeParams>,
}

impl Path {
    #[must_use]
    pub fn new(id: Handle) -> Self {
        Self {
            id,
            ref_count: RefCount::new(),
            data: RefCell::new(PathData::default()),
            stroke: Cell::new(StrokeParams::default()),
        }
    }

    /// Replaces the command stream; `coords` must supply exactly what the commands consume.
    pub fn set_commands(&self, commands: &[PathCommand], coords: &[f32]) -> Result<()> {
        let expected: usize = commands.iter().map(|command| command.coord_count()).sum();
        if expected != coords.len() {
            return Err(TesselError::InvalidValue(format!(
                "path commands consume {expected} coordinates, {} given",
                coords.len()
            )));
        }
        let mut data = self.data.borrow_mut();
        data.commands = SmallVec::from_slice(commands);
        data.coords = coords.to_vec();
        Ok(())
    }

    /// Has at least one command
    #[must_use]
    pub fn has_path_data(&self) -> bool {
        !self.data.borrow().commands.is_empty()
    }

    #[must_use]
    pub fn command_count(&self) -> usize {
        self.data.borrow().commands.len()
    }

    #[must_use]
    pub fn coords(&self) -> Vec<f32> {
        self.data.borrow().coords.clone()
    }

    #[must_use]
    pub fn stroke(&self) -> StrokeParams {
        self.stroke.get()
    }

    pub fn set_stroke(&self, stroke: StrokeParams) -> Result<()> {
        if stroke.width < 0.0 || stroke.miter_limit < 0.0 {
            return Err(TesselError::InvalidValue(
                "stroke width and miter limit must not be negative".to_string(),
            ));
        }
        self.stroke.set(StrokeParams {
            bound: stroke.bound.clamp(0.0, 1.0),
            ..stroke
        });
        Ok(())
    }
}

impl Resource for Path {
    const KIND: &'static str = "path";

    fn id(&self) -> Handle {
        self.id
    }

    fn ref_count(&self) -> &RefCount {
        &self.ref_count
    }
}
