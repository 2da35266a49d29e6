//! Tessel Core
//!
//! Handle allocation and generic, ref-counted object tables.
//!
//! - [`handle_allocator`]: lowest-available handle issuing, contiguous ranges
//! - [`object_table`]: handle -> empty / filled slot mapping
//! - [`ref_count`]: holder counts, deletion flag, the owning [`ResourceRef`] edge
//! - [`resource_manager`]: two-phase creation and deferred deletion per kind

pub mod errors;
pub mod handle;
pub mod handle_allocator;
pub mod object_table;
pub mod ref_count;
pub mod resource_manager;
pub mod version_tracker;

pub use errors::{Result, TesselError};
pub use handle::Handle;
pub use handle_allocator::HandleAllocator;
pub use object_table::{ObjectTable, SlotState};
pub use ref_count::{RefCount, ReleaseQueue, Resource, ResourceRef};
pub use resource_manager::{ResourceManager, defer_while_referenced, destroy_now};
pub use version_tracker::ChangeTracker;
