//! GUI frontend for the lattice simulation.
//!
//! The viewer runs on the main thread at ~60 fps while the simulation
//! thread evolves the lattice as fast as the shared lock allows. The two
//! sides communicate only through the guarded lattice state: the renderer
//! copies one consistent snapshot per frame and paints it.

mod app;

pub use app::{run_gui, PetriApp};
