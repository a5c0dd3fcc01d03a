//! This module contains the definition of the `Printer` trait that renders a
//! view of a contract as text, along with a registry of printers.

pub mod call_graph;
pub mod human_summary;

use std::{any::Any, collections::BTreeMap, fmt::Debug};

use downcast_rs::Downcast;

use crate::{
    constant::MAIN_UNIT_NAME,
    contract::Contract,
    printer::{call_graph::CallGraph, human_summary::HumanSummary},
};

/// A trait representing a textual rendering of a contract.
pub trait Printer
where
    Self: Any + Debug + Downcast,
{
    /// The unique name of the printer, used to select it.
    fn name(&self) -> &str;

    /// Renders `contract` as text.
    fn print(&self, contract: &Contract) -> String;
}

/// A container for a set of printers, keyed by their names.
#[derive(Debug)]
pub struct Printers {
    printers: BTreeMap<String, Box<dyn Printer>>,
}

impl Printers {
    /// Constructs a new container with no printers in it.
    #[must_use]
    pub fn new() -> Self {
        let printers = BTreeMap::new();
        Self { printers }
    }

    /// Adds the `printer` to the container, replacing any printer with the same
    /// name.
    pub fn add<P: Printer>(&mut self, printer: P) {
        self.printers.insert(printer.name().to_string(), Box::new(printer));
    }

    /// Gets the printer called `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Printer> {
        self.printers.get(name).map(|p| &**p)
    }

    /// Gets the names of the contained printers in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.printers.keys().map(String::as_str)
    }

    /// Renders `contract` with the printer called `name`, if it exists.
    #[must_use]
    pub fn print(&self, name: &str, contract: &Contract) -> Option<String> {
        self.get(name).map(|p| p.print(contract))
    }
}

impl Default for Printers {
    fn default() -> Self {
        // Keep these sorted for easy visual grep
        let mut printers = Self::new();
        printers.add(CallGraph);
        printers.add(HumanSummary);

        printers
    }
}

/// Gets the name of the unit of code that owns a block, given its recorded
/// `owner`.
fn unit_name(owner: Option<&str>) -> &str {
    owner.unwrap_or(MAIN_UNIT_NAME)
}
