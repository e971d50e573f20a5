//! Placed netlist intermediate representation.
//!
//! An intermediate-level representation of a placed (and possibly routed)
//! FPGA design: the leaf cells of the netlist, the nets connecting them, and
//! the per-entity annotation records vendor tools attach to both.
//!
//! The structures in this crate use strings, rather than generics, to name
//! cells, nets, annotations, and library cells. This format is designed to be
//! easy to produce from checkpoint readers and easy to consume by netlist
//! transformation passes and checkpoint writers.
//!
//! Cells and nets are stored in insertion order, and iteration visits them in
//! that order. Annotation ("property") stores make no ordering guarantee
//! across keys; keys are unique within one entity's store.
//!
//! The device and cell library are immutable reference data: they are loaded
//! once alongside a design and never modified afterwards.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};


/// An opaque cell identifier.
///
/// A cell ID created in the context of one design must
/// *not* be used in the context of another design.
/// You should instead create a new cell ID in the second design.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellId(u64);

/// An opaque net identifier.
///
/// A net ID created in the context of one design must
/// *not* be used in the context of another design.
/// You should instead create a new net ID in the second design.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetId(u64);

impl Display for CellId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell{}", self.0)
    }
}

impl Display for NetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "net{}", self.0)
    }
}

/// The origin/semantic domain of a [`Property`].
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Export-format (EDIF) metadata, carried into the netlist written for
    /// the downstream tool.
    Edif,
    /// Design-level metadata produced by the authoring tool.
    #[default]
    Design,
    /// A user-supplied annotation.
    User,
}

impl Display for PropertyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Edif => write!(f, "edif"),
            Self::Design => write!(f, "design"),
            Self::User => write!(f, "user"),
        }
    }
}

/// A named annotation record attached to a cell or net.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// The annotation key.
    ///
    /// Unique within one entity's [`Properties`] store.
    pub key: ArcStr,
    /// The origin/semantic domain of this annotation.
    pub kind: PropertyKind,
    /// The annotation value.
    ///
    /// Values are opaque to this crate.
    pub value: ArcStr,
}

impl Property {
    /// Creates a new property record.
    pub fn new(key: impl Into<ArcStr>, kind: PropertyKind, value: impl Into<ArcStr>) -> Self {
        Self {
            key: key.into(),
            kind,
            value: value.into(),
        }
    }
}

/// The error returned when adding a property whose key is already present.
///
/// Callers are expected to test presence with [`Properties::has`] before
/// adding; hitting this error indicates a violated invariant in the caller,
/// not a user-facing condition.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("property key `{0}` is already present")]
pub struct DuplicateKey(pub ArcStr);

/// A store of [`Property`] records owned by a single cell or net.
///
/// Keys are unique within the store. Mutating a store has no effect on any
/// other entity's store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Properties {
    records: IndexMap<ArcStr, Property>,
}

impl Properties {
    /// Creates a new, empty property store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a property with the given key is present,
    /// regardless of its value or kind.
    #[inline]
    pub fn has(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Gets the property with the given key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.records.get(key)
    }

    /// Adds the given property to the store.
    ///
    /// Fails with [`DuplicateKey`] if a property with the same key is already
    /// present; the existing record is left unmodified in that case.
    pub fn add(&mut self, property: Property) -> Result<(), DuplicateKey> {
        if self.records.contains_key(&property.key) {
            tracing::error!("property key `{}` is already present", property.key);
            return Err(DuplicateKey(property.key));
        }
        self.records.insert(property.key.clone(), property);
        Ok(())
    }

    /// Removes the property with the given key, returning it.
    ///
    /// A no-op returning [`None`] if the key is absent.
    pub fn remove(&mut self, key: &str) -> Option<Property> {
        self.records.shift_remove(key)
    }

    /// Iterates over the properties in the store.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.records.values()
    }

    /// The number of properties in the store.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no properties.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The classification of a library cell and of every netlist cell
/// instantiating it.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// A lookup-table primitive with the given number of inputs.
    Lut {
        /// The number of LUT inputs (e.g. 6 for a LUT6).
        inputs: u8,
    },
    /// A register primitive.
    Register,
    /// A carry-chain primitive.
    Carry,
    /// A block RAM primitive.
    Bram,
    /// A DSP primitive.
    Dsp,
    /// An I/O buffer primitive.
    Iob,
    /// Any other primitive, identified by its library-cell name.
    Other(ArcStr),
}

impl CellKind {
    /// Returns `true` if this kind is a lookup-table primitive.
    #[inline]
    pub fn is_lut(&self) -> bool {
        matches!(self, Self::Lut { .. })
    }
}

/// A cell in the cell library.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LibraryCell {
    /// The library-cell name (e.g. `LUT6`, `FDRE`).
    pub name: ArcStr,
    /// The classification of this library cell.
    pub kind: CellKind,
}

impl LibraryCell {
    /// Creates a new library cell.
    pub fn new(name: impl Into<ArcStr>, kind: CellKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The library of primitive cells a design may instantiate.
///
/// Loaded once alongside a design; read-only afterwards.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CellLibrary {
    cells: IndexMap<ArcStr, LibraryCell>,
}

impl CellLibrary {
    /// Creates a new, empty cell library.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given library cell, replacing any previous cell of the same
    /// name.
    pub fn add(&mut self, cell: LibraryCell) {
        self.cells.insert(cell.name.clone(), cell);
    }

    /// Gets the library cell with the given name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&LibraryCell> {
        self.cells.get(name)
    }

    /// Iterates over the library cells in insertion order.
    #[inline]
    pub fn cells(&self) -> impl Iterator<Item = &LibraryCell> {
        self.cells.values()
    }

    /// The number of cells in the library.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the library holds no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// The target device a design was placed against.
///
/// Loaded once alongside a design; read-only afterwards.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// The full part name (e.g. `xc7a100tcsg324`).
    pub part: ArcStr,
    /// The device family (e.g. `artix7`).
    pub family: ArcStr,
}

impl Device {
    /// Creates a new device descriptor.
    pub fn new(part: impl Into<ArcStr>, family: impl Into<ArcStr>) -> Self {
        Self {
            part: part.into(),
            family: family.into(),
        }
    }
}

/// A leaf cell instantiated in a design.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    name: ArcStr,
    /// The name of the library cell this cell instantiates.
    lib_cell: ArcStr,
    kind: CellKind,
    /// The site this cell is placed on, if placed.
    site: Option<ArcStr>,
    properties: Properties,
}

impl Cell {
    /// Creates a new cell instantiating the given library cell.
    pub fn new(name: impl Into<ArcStr>, lib_cell: &LibraryCell) -> Self {
        Self {
            name: name.into(),
            lib_cell: lib_cell.name.clone(),
            kind: lib_cell.kind.clone(),
            site: None,
            properties: Properties::new(),
        }
    }

    /// The name of this cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The name of the library cell this cell instantiates.
    #[inline]
    pub fn lib_cell(&self) -> &ArcStr {
        &self.lib_cell
    }

    /// The classification of this cell.
    #[inline]
    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    /// Returns `true` if this cell is a lookup-table primitive.
    #[inline]
    pub fn is_lut(&self) -> bool {
        self.kind.is_lut()
    }

    /// The site this cell is placed on, if placed.
    #[inline]
    pub fn site(&self) -> Option<&ArcStr> {
        self.site.as_ref()
    }

    /// Places this cell on the given site.
    pub fn place(&mut self, site: impl Into<ArcStr>) {
        self.site = Some(site.into());
    }

    /// Removes this cell's placement.
    pub fn unplace(&mut self) {
        self.site = None;
    }

    /// The properties attached to this cell.
    #[inline]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// A mutable view of the properties attached to this cell.
    #[inline]
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// The classification of a net.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum NetKind {
    /// An ordinary signal net.
    #[default]
    Wire,
    /// A clock net.
    Clock,
    /// A net tied to the power rail.
    Power,
    /// A net tied to the ground rail.
    Ground,
}

/// A net connecting cells in a design.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Net {
    name: ArcStr,
    kind: NetKind,
    /// The wires/PIPs used by this net's route, in traversal order.
    ///
    /// Empty for unrouted nets.
    route: Vec<ArcStr>,
    properties: Properties,
}

impl Net {
    /// Creates a new, unrouted net.
    pub fn new(name: impl Into<ArcStr>, kind: NetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            route: Vec::new(),
            properties: Properties::new(),
        }
    }

    /// The name of this net.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The classification of this net.
    #[inline]
    pub fn kind(&self) -> NetKind {
        self.kind
    }

    /// The wires/PIPs used by this net's route, in traversal order.
    #[inline]
    pub fn route(&self) -> &[ArcStr] {
        &self.route
    }

    /// Returns `true` if this net carries a route.
    #[inline]
    pub fn is_routed(&self) -> bool {
        !self.route.is_empty()
    }

    /// Replaces this net's route.
    pub fn set_route(&mut self, route: Vec<ArcStr>) {
        self.route = route;
    }

    /// Discards this net's route.
    pub fn unroute(&mut self) {
        self.route.clear();
    }

    /// The properties attached to this net.
    #[inline]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// A mutable view of the properties attached to this net.
    #[inline]
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// An opaque physical/DRC constraint record.
///
/// Constraints are (directive, body) pairs whose contents are not interpreted
/// by this crate. A design's constraint sequence is append-only and keeps
/// records in injection order; records are never deduplicated.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// The constraint directive (e.g. `set_property`).
    pub directive: ArcStr,
    /// The constraint body, opaque to this crate.
    pub body: ArcStr,
}

impl Constraint {
    /// Creates a new constraint record.
    pub fn new(directive: impl Into<ArcStr>, body: impl Into<ArcStr>) -> Self {
        Self {
            directive: directive.into(),
            body: body.into(),
        }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.directive, self.body)
    }
}

/// A placed (and possibly routed) design.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Design {
    /// The current cell ID counter.
    ///
    /// Initialized to 0 when the design is created.
    /// Should be incremented before assigning a new ID.
    cell_id: u64,
    /// The current net ID counter.
    net_id: u64,

    /// The name of the design.
    name: ArcStr,

    /// The part this design targets.
    part: ArcStr,

    /// A map of the cells in the design.
    cells: HashMap<CellId, Cell>,

    /// A map of cell name to cell ID.
    cell_names: HashMap<ArcStr, CellId>,

    /// The order in which cells were added to this design.
    cell_order: Vec<CellId>,

    /// A map of the nets in the design.
    nets: HashMap<NetId, Net>,

    /// A map of net name to net ID.
    net_names: HashMap<ArcStr, NetId>,

    /// The order in which nets were added to this design.
    net_order: Vec<NetId>,

    /// The design's constraint sequence, in injection order.
    constraints: Vec<Constraint>,
}

impl Design {
    /// Creates a new, empty design targeting the given part.
    pub fn new(name: impl Into<ArcStr>, part: impl Into<ArcStr>) -> Self {
        Self {
            cell_id: 0,
            net_id: 0,
            name: name.into(),
            part: part.into(),
            cells: HashMap::new(),
            cell_names: HashMap::new(),
            cell_order: Vec::new(),
            nets: HashMap::new(),
            net_names: HashMap::new(),
            net_order: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// The name of the design.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The part this design targets.
    #[inline]
    pub fn part(&self) -> &ArcStr {
        &self.part
    }

    /// Adds the given cell to the design.
    ///
    /// Returns the ID of the newly added cell.
    pub fn add_cell(&mut self, cell: Cell) -> CellId {
        self.cell_id += 1;
        let id = CellId(self.cell_id);
        self.cell_names.insert(cell.name.clone(), id);
        self.cells.insert(id, cell);
        self.cell_order.push(id);
        id
    }

    /// Adds the given net to the design.
    ///
    /// Returns the ID of the newly added net.
    pub fn add_net(&mut self, net: Net) -> NetId {
        self.net_id += 1;
        let id = NetId(self.net_id);
        self.net_names.insert(net.name.clone(), id);
        self.nets.insert(id, net);
        self.net_order.push(id);
        id
    }

    /// Gets the cell with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no cell has the given ID.
    /// For a non-panicking alternative, see [`try_cell`](Design::try_cell).
    pub fn cell(&self, id: CellId) -> &Cell {
        self.cells.get(&id).unwrap()
    }

    /// Gets the cell with the given ID.
    #[inline]
    pub fn try_cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    /// Gets the cell with the given name.
    pub fn cell_named(&self, name: &str) -> Option<&Cell> {
        self.cell_names.get(name).map(|id| self.cell(*id))
    }

    /// Gets the net with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no net has the given ID.
    /// For a non-panicking alternative, see [`try_net`](Design::try_net).
    pub fn net(&self, id: NetId) -> &Net {
        self.nets.get(&id).unwrap()
    }

    /// Gets the net with the given ID.
    #[inline]
    pub fn try_net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(&id)
    }

    /// Gets the net with the given name.
    pub fn net_named(&self, name: &str) -> Option<&Net> {
        self.net_names.get(name).map(|id| self.net(*id))
    }

    /// Iterates over the cells in the design, in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cell_order.iter().map(|id| self.cell(*id))
    }

    /// Iterates mutably over the cells in the design.
    ///
    /// Unlike [`cells`](Design::cells), no iteration order is guaranteed.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.values_mut()
    }

    /// Iterates over the nets in the design, in insertion order.
    pub fn nets(&self) -> impl Iterator<Item = &Net> {
        self.net_order.iter().map(|id| self.net(*id))
    }

    /// Iterates mutably over the nets in the design.
    ///
    /// Unlike [`nets`](Design::nets), no iteration order is guaranteed.
    pub fn nets_mut(&mut self) -> impl Iterator<Item = &mut Net> {
        self.nets.values_mut()
    }

    /// The number of cells in the design.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// The number of nets in the design.
    #[inline]
    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    /// Appends the given constraint to the design's constraint sequence.
    ///
    /// Constraints are kept in injection order and never deduplicated.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// The design's constraint sequence, in injection order.
    #[inline]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }
}
