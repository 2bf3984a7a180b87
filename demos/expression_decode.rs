//! Example demonstrating push-down expression decoding

use chrono::FixedOffset;
use distsql::expression::{build_expr, build_exprs, ScalarFuncSig, WireExpr};
use distsql::types::field_type::{type_code, WireFieldType};
use distsql::types::{FieldType, Value};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Push-down Expression Decode Demo");
    println!("================================");

    // The result schema a coordinator would ship alongside the fragment.
    let schema = vec![
        FieldType::new(type_code::LONG_LONG),   // age
        FieldType::new(type_code::VAR_STRING),  // name
    ];
    let tz = FixedOffset::east_opt(0).unwrap();

    // Example 1: a simple comparison filter, age > 18
    println!("\n1. Simple Comparison");
    println!("--------------------");

    let filter = WireExpr::scalar_func(
        ScalarFuncSig::GtInt.code(),
        vec![WireExpr::column_ref(0), WireExpr::int64(18)],
        WireExpr::bool_field_type(),
    );
    let expr = build_expr(&filter, &schema, tz)?;
    println!("decoded: {}", expr);

    // Example 2: a compound filter, (age > 18) AND (name = 'alice')
    println!("\n2. Compound Filter");
    println!("------------------");

    let age_check = WireExpr::scalar_func(
        ScalarFuncSig::GtInt.code(),
        vec![WireExpr::column_ref(0), WireExpr::int64(18)],
        WireExpr::bool_field_type(),
    );
    let name_check = WireExpr::scalar_func(
        ScalarFuncSig::EqString.code(),
        vec![WireExpr::column_ref(1), WireExpr::string("alice")],
        WireExpr::bool_field_type(),
    );
    let compound = WireExpr::scalar_func(
        ScalarFuncSig::LogicalAnd.code(),
        vec![age_check, name_check],
        WireExpr::bool_field_type(),
    );
    let expr = build_expr(&compound, &schema, tz)?;
    println!("decoded: {}", expr);

    // Example 3: IN over a value list, age IN (21, 42)
    println!("\n3. IN List");
    println!("----------");

    let list = WireExpr::value_list(&[Value::Int64(21), Value::Int64(42)])?;
    let membership = WireExpr::scalar_func(
        ScalarFuncSig::InInt.code(),
        vec![WireExpr::column_ref(0), list],
        WireExpr::bool_field_type(),
    );
    let expr = build_expr(&membership, &schema, tz)?;
    println!("decoded: {}", expr);

    // Example 4: a whole fragment decoded in one batch
    println!("\n4. Batch Decode");
    println!("---------------");

    let fragment = vec![
        WireExpr::column_ref(1),
        WireExpr::scalar_func(
            ScalarFuncSig::PlusInt.code(),
            vec![WireExpr::column_ref(0), WireExpr::int64(1)],
            WireFieldType::new(type_code::LONG_LONG),
        ),
    ];
    for expr in build_exprs(&fragment, &schema, tz)? {
        println!("decoded: {}", expr);
    }

    Ok(())
}
