use crate::{contract::ContractBuilder, registry::TypeRegistry, Result};

/// Register the fixture contracts used across unit tests
///
/// - `Traversable` / `IteratorAggregate` (`getIterator`)
/// - `Anonymizer\InterfaceWithOneMethod` (`a`)
/// - `Anonymizer\AbstractClassWithOneAbstractMethod` (abstract `a`)
/// - `Anonymizer\AbstractClassWithOneConcreteMethod` (concrete `a`)
/// - `Anonymizer\AbstractClassWithOneAbstractAndOneConcreteMethod` (concrete `a`, abstract `b`)
pub fn register_fixtures(registry: &TypeRegistry) -> Result<()> {
    ContractBuilder::interface("Traversable").build(registry)?;
    ContractBuilder::interface("IteratorAggregate")
        .extends("Traversable")
        .operation("getIterator", "")?
        .build(registry)?;

    ContractBuilder::interface("Anonymizer\\InterfaceWithOneMethod")
        .operation("a", "")?
        .build(registry)?;
    ContractBuilder::abstract_class("Anonymizer\\AbstractClassWithOneAbstractMethod")
        .operation("a", "")?
        .build(registry)?;
    ContractBuilder::abstract_class("Anonymizer\\AbstractClassWithOneConcreteMethod")
        .concrete_operation("a", "")?
        .build(registry)?;
    ContractBuilder::abstract_class("Anonymizer\\AbstractClassWithOneAbstractAndOneConcreteMethod")
        .concrete_operation("a", "")?
        .operation("b", "")?
        .build(registry)?;

    Ok(())
}
