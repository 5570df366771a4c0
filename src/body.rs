use nalgebra::Vector3;

/// One gravitating point mass.
///
/// The name is a display/output key only; it plays no part in the physics.
/// During integration a body's identity is its index in the scenario's list,
/// and that order must not change once an engine starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    /// Strictly positive. Before the engines run this is folded together
    /// with the gravitational constant (see `frame::premultiply_gravity`),
    /// so the force model never multiplies by G itself.
    pub mass: f64,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl Body {
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Self {
        Body {
            name: name.into(),
            mass,
            position,
            velocity,
        }
    }
}

/// A validated set of initial conditions: the ordered body list and how many
/// simulated days to run for.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub days: u32,
    pub bodies: Vec<Body>,
}
