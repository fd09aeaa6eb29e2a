//! Integration tests for contract declaration and signature handling.

use anonymizer::prelude::*;

#[test]
fn test_inheritance_chain() -> Result<()> {
    let registry = TypeRegistry::new();
    ContractBuilder::interface("Countable")
        .operation("count", "")?
        .build(&registry)?;
    ContractBuilder::interface("Collection")
        .extends("Countable")
        .operation("add", "item")?
        .build(&registry)?;
    ContractBuilder::abstract_class("AbstractCollection")
        .implements("Collection")
        .concrete_operation("count", "")?
        .concrete_operation("isEmpty", "")?
        .build(&registry)?;
    let list = ContractBuilder::abstract_class("List")
        .extends("AbstractCollection")
        .operation("get", "index")?
        .build(&registry)?;

    let required: Vec<String> = list
        .required_operations(&registry)?
        .into_iter()
        .map(|operation| operation.name)
        .collect();
    assert_eq!(required, vec!["get", "add"]);

    let concrete: Vec<String> = list
        .concrete_operations(&registry)?
        .into_iter()
        .map(|operation| operation.name)
        .collect();
    assert_eq!(concrete, vec!["count", "isEmpty"]);

    let instance = Anonymizer::new(&registry).generate(
        Some("List"),
        Implementations::new()
            .with("add", Implementation::with_signature("value", |_| Value::Null)?)
            .with("get", Implementation::with_signature("i", |args| args.arg(0).clone())?),
    )?;

    for ancestor in ["List", "AbstractCollection", "Collection", "Countable"] {
        assert!(instance.is_instance_of(ancestor), "{ancestor}");
    }
    assert!(!instance.is_instance_of("Traversable"));
    assert_eq!(instance.call("get", vec![Value::from(3)])?, Value::from(3));
    assert_eq!(instance.operations().count(), 4);
    Ok(())
}

#[test]
fn test_registry_counts() -> Result<()> {
    let registry = TypeRegistry::new();
    let contract = ContractBuilder::interface("Runnable")
        .operation("run", "")?
        .build(&registry)?;
    assert_eq!(contract.flavor, ContractFlavor::Interface);
    assert_eq!(registry.contract_count(), 1);

    let generator = Anonymizer::new(&registry);
    for _ in 0..3 {
        generator.generate(
            Some("Runnable"),
            Implementations::new().with("run", Implementation::returning(true)),
        )?;
    }

    assert_eq!(registry.generated_count(), 3);
    assert_eq!(registry.len(), 4);
    assert!(registry
        .generated_types()
        .iter()
        .all(|generated| generated.token().is_generated()));
    Ok(())
}

#[test]
fn test_signature_round_trip() -> Result<()> {
    for declaration in [
        "",
        "a",
        "array &items, callable visitor = null",
        "Some\\Class value, depth = 3, ratio = 0.5, label = 'x', flags = [1, [true, false]]",
    ] {
        let signature = SignatureMethod::parse(declaration)?;
        assert_eq!(signature.to_string(), declaration);
        assert_eq!(SignatureMethod::parse(&signature.to_string())?, signature);
    }
    Ok(())
}

#[test]
fn test_signature_errors_report_position() {
    match parse_method_signature("a, b = ") {
        Err(Error::SignatureParse { position, .. }) => assert_eq!(position, 7),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        parse_method_signature("a, a"),
        Err(Error::SignatureParse { position: 3, .. })
    ));
}
