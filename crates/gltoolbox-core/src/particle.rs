//! Kinematic particles with a dynamic property bag.
//!
//! A [`Particle`] is a point that can spin around the origin and drift along
//! each axis every [`Particle::update`]. Arbitrary data can be attached
//! through [`PropertyValue`]s, and named callbacks can be bound to run on
//! every update or on demand.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use glam::DVec3;

use crate::error::{Result, ToolboxError};
use crate::math::Axis;

/// A function stored inside a property.
pub type PropertyFn = Rc<dyn Fn(&[PropertyValue]) -> Option<PropertyValue>>;

/// A callback bound to a particle.
pub type ParticleCallback = Box<dyn FnMut(&mut Particle)>;

/// Key of a particle property.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    /// Integer key.
    Index(i64),
    /// String key.
    Name(String),
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<i64> for PropertyKey {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Operation applied by [`Particle::modify_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyOperator {
    /// Addition, string and list concatenation.
    Add,
    /// Logical and, returning the deciding operand.
    And,
    /// Subtraction.
    Diff,
    /// Division. Integer operands produce a number.
    Div,
    /// Modulo with the sign of the divisor.
    Mod,
    /// Multiplication.
    Mult,
    /// Logical or, returning the deciding operand.
    Or,
    /// Exponentiation.
    Pow,
    /// Logical exclusive or.
    Xor,
}

/// A value stored in a particle property.
#[derive(Clone)]
pub enum PropertyValue {
    Number(f64),
    Integer(i64),
    Bool(bool),
    Text(String),
    Vector(DVec3),
    List(Vec<PropertyValue>),
    /// Opaque backend handle (texture, draw list, program).
    Handle(u32),
    Callable(PropertyFn),
}

impl PropertyValue {
    /// Wraps a closure as a callable property.
    pub fn callable(f: impl Fn(&[PropertyValue]) -> Option<PropertyValue> + 'static) -> Self {
        Self::Callable(Rc::new(f))
    }

    /// Returns the name of this value's kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Vector(_) => "vector",
            Self::List(_) => "list",
            Self::Handle(_) => "handle",
            Self::Callable(_) => "callable",
        }
    }

    /// Returns whether the value counts as true in logical operations.
    ///
    /// Zero numbers, empty text and lists, and the zero vector are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(v) => *v != 0.0,
            Self::Integer(v) => *v != 0,
            Self::Bool(v) => *v,
            Self::Text(v) => !v.is_empty(),
            Self::Vector(v) => *v != DVec3::ZERO,
            Self::List(v) => !v.is_empty(),
            Self::Handle(_) | Self::Callable(_) => true,
        }
    }

    /// Returns the value as a float if it is numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Combines this value with `rhs` using `operator`.
    ///
    /// `property` names the property being modified and is only used for
    /// error messages.
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(
        &self,
        operator: PropertyOperator,
        rhs: &PropertyValue,
        property: &str,
    ) -> Result<PropertyValue> {
        use PropertyValue::{Integer, List, Number, Text, Vector};

        let mismatch = |expected: &'static str| ToolboxError::PropertyType {
            property: property.to_string(),
            expected,
        };
        let zero_division = || ToolboxError::DivisionByZero(property.to_string());

        match operator {
            PropertyOperator::And => Ok(if self.is_truthy() {
                rhs.clone()
            } else {
                self.clone()
            }),
            PropertyOperator::Or => Ok(if self.is_truthy() {
                self.clone()
            } else {
                rhs.clone()
            }),
            PropertyOperator::Xor => Ok(PropertyValue::Bool(self.is_truthy() != rhs.is_truthy())),
            PropertyOperator::Add => match (self, rhs) {
                (Integer(a), Integer(b)) => Ok(Integer(a.wrapping_add(*b))),
                (Vector(a), Vector(b)) => Ok(Vector(*a + *b)),
                (Text(a), Text(b)) => Ok(Text(format!("{a}{b}"))),
                (List(a), List(b)) => Ok(List(a.iter().chain(b).cloned().collect())),
                _ => numeric(self, rhs)
                    .map(|(a, b)| Number(a + b))
                    .ok_or_else(|| mismatch(self.kind())),
            },
            PropertyOperator::Diff => match (self, rhs) {
                (Integer(a), Integer(b)) => Ok(Integer(a.wrapping_sub(*b))),
                (Vector(a), Vector(b)) => Ok(Vector(*a - *b)),
                _ => numeric(self, rhs)
                    .map(|(a, b)| Number(a - b))
                    .ok_or_else(|| mismatch(self.kind())),
            },
            PropertyOperator::Mult => match (self, rhs) {
                (Integer(a), Integer(b)) => Ok(Integer(a.wrapping_mul(*b))),
                (Vector(a), Vector(b)) => Ok(Vector(*a * *b)),
                (Vector(v), scalar) | (scalar, Vector(v)) => scalar
                    .as_f64()
                    .map(|s| Vector(*v * s))
                    .ok_or_else(|| mismatch("number")),
                _ => numeric(self, rhs)
                    .map(|(a, b)| Number(a * b))
                    .ok_or_else(|| mismatch("number")),
            },
            PropertyOperator::Div => match (self, rhs) {
                (Vector(v), scalar) => {
                    let s = scalar.as_f64().ok_or_else(|| mismatch("number"))?;
                    if s == 0.0 {
                        return Err(zero_division());
                    }
                    Ok(Vector(*v / s))
                }
                _ => {
                    let (a, b) = numeric(self, rhs).ok_or_else(|| mismatch("number"))?;
                    if b == 0.0 {
                        return Err(zero_division());
                    }
                    Ok(Number(a / b))
                }
            },
            PropertyOperator::Mod => match (self, rhs) {
                (Integer(_), Integer(0)) => Err(zero_division()),
                (Integer(a), Integer(b)) => {
                    let r = a.wrapping_rem(*b);
                    Ok(Integer(if r != 0 && (r < 0) != (*b < 0) { r + b } else { r }))
                }
                _ => {
                    let (a, b) = numeric(self, rhs).ok_or_else(|| mismatch("number"))?;
                    if b == 0.0 {
                        return Err(zero_division());
                    }
                    let r = a % b;
                    Ok(Number(if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }))
                }
            },
            PropertyOperator::Pow => match (self, rhs) {
                (Integer(a), Integer(b)) if *b >= 0 => {
                    let exact = u32::try_from(*b).ok().and_then(|e| a.checked_pow(e));
                    Ok(exact.map_or_else(|| Number((*a as f64).powf(*b as f64)), Integer))
                }
                _ => numeric(self, rhs)
                    .map(|(a, b)| Number(a.powf(b)))
                    .ok_or_else(|| mismatch("number")),
            },
        }
    }
}

fn numeric(a: &PropertyValue, b: &PropertyValue) -> Option<(f64, f64)> {
    Some((a.as_f64()?, b.as_f64()?))
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => f.debug_tuple("Number").field(v).finish(),
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Vector(v) => f.debug_tuple("Vector").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Handle(v) => f.debug_tuple("Handle").field(v).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Vector(a), Self::Vector(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Handle(a), Self::Handle(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Vector(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Handle(v) => write!(f, "#{v}"),
            Self::Callable(_) => f.write_str("<callable>"),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<DVec3> for PropertyValue {
    fn from(v: DVec3) -> Self {
        Self::Vector(v)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(v: Vec<PropertyValue>) -> Self {
        Self::List(v)
    }
}

struct BoundCallback {
    name: String,
    exec_on_update: bool,
    callback: Rc<RefCell<ParticleCallback>>,
}

/// A point that rotates around the origin and translates along the axes.
pub struct Particle {
    name: String,
    position: DVec3,
    angular_velocity: DVec3,
    rotating: [bool; 3],
    velocity: DVec3,
    moving: [bool; 3],
    properties: BTreeMap<PropertyKey, PropertyValue>,
    callbacks: Vec<BoundCallback>,
}

impl Particle {
    /// Creates a still particle at `position`.
    pub fn new(position: DVec3) -> Self {
        Self {
            name: "unnamed".to_string(),
            position,
            angular_velocity: DVec3::ZERO,
            rotating: [false; 3],
            velocity: DVec3::ZERO,
            moving: [false; 3],
            properties: BTreeMap::new(),
            callbacks: Vec::new(),
        }
    }

    /// Sets the name, consuming and returning self.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    /// Sets a single coordinate.
    pub fn set_coordinate(&mut self, axis: Axis, value: f64) {
        self.position[axis.index()] = value;
    }

    /// Rotates the particle around `axis` through the origin by `angle` degrees.
    pub fn rotate(&mut self, axis: Axis, angle: f64) {
        if angle != 0.0 {
            self.position = axis.rotate(self.position, angle);
        }
    }

    /// Moves the particle by `delta` along `axis`.
    pub fn move_axis(&mut self, axis: Axis, delta: f64) {
        self.position[axis.index()] += delta;
    }

    pub fn angular_velocity(&self) -> DVec3 {
        self.angular_velocity
    }

    /// Sets the angular velocity in degrees per update on all axes.
    pub fn set_angular_velocity(&mut self, velocity: DVec3) {
        self.angular_velocity = velocity;
    }

    /// Sets the angular velocity on one axis, optionally starting rotation on it.
    pub fn set_angular_velocity_axis(&mut self, axis: Axis, velocity: f64, enable: bool) {
        self.angular_velocity[axis.index()] = velocity;
        if enable {
            self.start_rotation(axis);
        }
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// Sets the linear velocity in units per update on all axes.
    pub fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = velocity;
    }

    /// Sets the linear velocity on one axis, optionally starting movement on it.
    pub fn set_velocity_axis(&mut self, axis: Axis, velocity: f64, enable: bool) {
        self.velocity[axis.index()] = velocity;
        if enable {
            self.start_movement(axis);
        }
    }

    pub fn start_rotation(&mut self, axis: Axis) {
        self.rotating[axis.index()] = true;
    }

    pub fn stop_rotation(&mut self, axis: Axis) {
        self.rotating[axis.index()] = false;
    }

    pub fn start_rotation_all(&mut self) {
        self.rotating = [true; 3];
    }

    pub fn stop_rotation_all(&mut self) {
        self.rotating = [false; 3];
    }

    pub fn start_movement(&mut self, axis: Axis) {
        self.moving[axis.index()] = true;
    }

    pub fn stop_movement(&mut self, axis: Axis) {
        self.moving[axis.index()] = false;
    }

    pub fn start_movement_all(&mut self) {
        self.moving = [true; 3];
    }

    pub fn stop_movement_all(&mut self) {
        self.moving = [false; 3];
    }

    /// Enables rotation and movement on every axis.
    pub fn start(&mut self) {
        self.start_rotation_all();
        self.start_movement_all();
    }

    /// Disables rotation and movement on every axis.
    pub fn stop(&mut self) {
        self.stop_rotation_all();
        self.stop_movement_all();
    }

    pub fn has_rotation(&self, axis: Axis) -> bool {
        self.rotating[axis.index()]
    }

    pub fn has_movement(&self, axis: Axis) -> bool {
        self.moving[axis.index()]
    }

    /// Advances the particle by one tick.
    ///
    /// Rotations run first (X, Y, Z), then translations (X, Y, Z), then every
    /// callback bound with `exec_on_update`, in bind order.
    pub fn update(&mut self) {
        for axis in Axis::ALL {
            if self.has_rotation(axis) {
                self.rotate(axis, self.angular_velocity[axis.index()]);
            }
        }
        for axis in Axis::ALL {
            if self.has_movement(axis) {
                self.move_axis(axis, self.velocity[axis.index()]);
            }
        }
        self.run_callbacks(|cb| cb.exec_on_update);
    }

    /// Binds a named callback.
    ///
    /// With `exec_on_update` the callback runs on every [`update`](Self::update);
    /// it can always be run through [`exec_callback`](Self::exec_callback).
    pub fn bind(
        &mut self,
        name: impl Into<String>,
        exec_on_update: bool,
        callback: impl FnMut(&mut Particle) + 'static,
    ) {
        let name = name.into();
        log::debug!("binding callback '{name}' to particle '{}'", self.name);
        self.callbacks.push(BoundCallback {
            name,
            exec_on_update,
            callback: Rc::new(RefCell::new(Box::new(callback))),
        });
    }

    /// Returns the number of bound callbacks.
    pub fn bound_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Returns the names of bound callbacks in bind order.
    pub fn bound_names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|cb| cb.name.as_str()).collect()
    }

    /// Runs every callback bound under `name`.
    pub fn exec_callback(&mut self, name: &str) -> Result<()> {
        if !self.callbacks.iter().any(|cb| cb.name == name) {
            return Err(ToolboxError::CallbackNotFound(name.to_string()));
        }
        self.run_callbacks(|cb| cb.name == name);
        Ok(())
    }

    // Runs against a snapshot of the bound list, so callbacks stay visible
    // (and executable) from inside a running callback. A callback already on
    // the stack is skipped rather than re-entered.
    fn run_callbacks(&mut self, filter: impl Fn(&BoundCallback) -> bool) {
        let pending: Vec<(String, Rc<RefCell<ParticleCallback>>)> = self
            .callbacks
            .iter()
            .filter(|cb| filter(*cb))
            .map(|cb| (cb.name.clone(), Rc::clone(&cb.callback)))
            .collect();
        for (name, callback) in pending {
            match callback.try_borrow_mut() {
                Ok(mut callback) => {
                    let callback: &mut ParticleCallback = &mut callback;
                    callback(self);
                }
                Err(_) => log::warn!(
                    "callback '{name}' on particle '{}' is already running, skipped",
                    self.name
                ),
            }
        }
    }

    /// Adds or replaces a property.
    pub fn add_property(&mut self, key: impl Into<PropertyKey>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Returns a property's value.
    pub fn property(&self, key: impl Into<PropertyKey>) -> Result<&PropertyValue> {
        let key = key.into();
        self.properties
            .get(&key)
            .ok_or_else(|| ToolboxError::PropertyNotFound(key.to_string()))
    }

    /// Returns the element at `index` of a list, vector or text property.
    pub fn property_at(&self, key: impl Into<PropertyKey>, index: usize) -> Result<PropertyValue> {
        let key = key.into();
        let value = self
            .properties
            .get(&key)
            .ok_or_else(|| ToolboxError::PropertyNotFound(key.to_string()))?;
        let element = match value {
            PropertyValue::List(items) => items.get(index).cloned(),
            PropertyValue::Vector(v) => (index < 3).then(|| PropertyValue::Number(v[index])),
            PropertyValue::Text(text) => text
                .chars()
                .nth(index)
                .map(|c| PropertyValue::Text(c.to_string())),
            _ => None,
        };
        element.ok_or(ToolboxError::PropertyIndex {
            property: key.to_string(),
            index,
        })
    }

    /// Returns the keys of every property in key order.
    pub fn property_keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.properties.keys()
    }

    /// Modifies an existing property.
    ///
    /// Without an operator the value is replaced; otherwise the stored value
    /// becomes `stored <operator> value`. On error the property is unchanged.
    pub fn modify_property(
        &mut self,
        key: impl Into<PropertyKey>,
        value: impl Into<PropertyValue>,
        operator: Option<PropertyOperator>,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();
        let stored = self
            .properties
            .get_mut(&key)
            .ok_or_else(|| ToolboxError::PropertyNotFound(key.to_string()))?;
        *stored = match operator {
            None => value,
            Some(operator) => stored.apply(operator, &value, &key.to_string())?,
        };
        Ok(())
    }

    /// Calls a callable property with `args`.
    pub fn exec_property(
        &self,
        key: impl Into<PropertyKey>,
        args: &[PropertyValue],
    ) -> Result<Option<PropertyValue>> {
        let key = key.into();
        match self.properties.get(&key) {
            Some(PropertyValue::Callable(f)) => Ok(f(args)),
            Some(_) => Err(ToolboxError::PropertyType {
                property: key.to_string(),
                expected: "callable",
            }),
            None => Err(ToolboxError::PropertyNotFound(key.to_string())),
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}

impl fmt::Debug for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Particle")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("angular_velocity", &self.angular_velocity)
            .field("rotating", &self.rotating)
            .field("velocity", &self.velocity)
            .field("moving", &self.moving)
            .field("properties", &self.properties)
            .field("callbacks", &self.bound_names())
            .finish()
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn on_off(flag: bool) -> &'static str {
            if flag {
                "on"
            } else {
                "off"
            }
        }
        let [rx, ry, rz] = self.rotating.map(on_off);
        let [mx, my, mz] = self.moving.map(on_off);
        let p = self.position;
        let w = self.angular_velocity;
        let v = self.velocity;
        let callbacks = if self.callbacks.is_empty() {
            "None".to_string()
        } else {
            self.bound_names().join(", ")
        };
        let properties = self
            .properties
            .keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        writeln!(f, "Particle: {}", self.name)?;
        writeln!(f, "XYZ position: ({:.2},{:.2},{:.2})", p.x, p.y, p.z)?;
        writeln!(
            f,
            "Angular velocity: ({:.2},{:.2},{:.2}); ({rx},{ry},{rz})",
            w.x, w.y, w.z
        )?;
        writeln!(
            f,
            "Linear velocity: ({:.2},{:.2},{:.2}); ({mx},{my},{mz})",
            v.x, v.y, v.z
        )?;
        writeln!(f, "Bound callbacks: {callbacks}")?;
        write!(f, "Properties: {properties}")
    }
}
