//! Shared host types for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use hostwrap_engine::{BridgeConfig, ObjectWrapper};
use hostwrap_sdk::{
    arg, HostError, HostObject, HostResult, HostType, HostValue, IntoHost, MemberDescriptor,
    NumericKind, RuntimeType, TypeCategory, TypeRegistry,
};

pub struct Person {
    pub name: String,
    pub age: i32,
}

pub struct Fixture {
    pub registry: Arc<TypeRegistry>,
    pub person: RuntimeType,
    pub employee: RuntimeType,
    pub formatter: RuntimeType,
    pub flag: RuntimeType,
    pub settings: RuntimeType,
}

pub fn int() -> HostType {
    HostType::Num(NumericKind::Int)
}

pub fn long() -> HostType {
    HostType::Num(NumericKind::Long)
}

pub fn double() -> HostType {
    HostType::Num(NumericKind::Double)
}

fn this_person(this: Option<&HostObject>) -> Result<&Person, HostError> {
    this.and_then(|o| o.downcast_ref::<Person>())
        .ok_or_else(|| HostError::mismatch("app.Person", "other"))
}

pub fn person_members(decl: &str, ty: &RuntimeType) -> Vec<MemberDescriptor> {
    let make = ty.clone();
    let make_one = ty.clone();
    let make_static = ty.clone();
    vec![
        MemberDescriptor::constructor(decl, vec![HostType::Str, int()], move |_, args| {
            let person = Person {
                name: arg(args, 0)?,
                age: arg(args, 1)?,
            };
            Ok(HostObject::new(make.clone(), person).into_host())
        }),
        MemberDescriptor::constructor(decl, vec![HostType::Str], move |_, args| {
            let person = Person {
                name: arg(args, 0)?,
                age: 0,
            };
            Ok(HostObject::new(make_one.clone(), person).into_host())
        }),
        MemberDescriptor::field(decl, "name", HostType::Str, |this| {
            Ok(this_person(this)?.name.as_str().into_host())
        }),
        MemberDescriptor::field(decl, "age", int(), |this| Ok((this_person(this)?.age + 1000).into_host())),
        MemberDescriptor::method(decl, "age", vec![], |this, _| Ok(this_person(this)?.age.into_host())),
        MemberDescriptor::method(decl, "greet", vec![HostType::Str], |this, args| {
            let other: String = arg(args, 0)?;
            Ok(format!("Hello, {}, I am {}", other, this_person(this)?.name).into_host())
        }),
        MemberDescriptor::method(decl, "greet", vec![HostType::Any], |_, _| Ok("Hello, object".into_host())),
        MemberDescriptor::method(decl, "to_string", vec![], |this, _| {
            Ok(format!("Person({})", this_person(this)?.name).into_host())
        }),
        MemberDescriptor::method(decl, "get_class", vec![], |_, _| Ok("app.Person".into_host())),
        MemberDescriptor::method(decl, "wait", vec![long()], |_, _| Ok(HostValue::Null)),
        MemberDescriptor::method(decl, "fail", vec![], |_, _| Err("boom".into())),
        MemberDescriptor::method(decl, "explode", vec![], |_, _| panic!("host panic")),
        MemberDescriptor::method(decl, "secret", vec![], |_, _| Ok(HostValue::Null)).private(),
        MemberDescriptor::method(decl, "of", vec![HostType::Str], move |_, args| {
            let person = Person {
                name: arg(args, 0)?,
                age: 1,
            };
            Ok(HostObject::new(make_static.clone(), person).into_host())
        })
        .as_static(),
    ]
}

fn tag(
    label: &'static str,
) -> impl Fn(Option<&HostObject>, &[HostValue]) -> HostResult<HostValue> + Send + Sync + 'static {
    move |_, _| Ok(label.into_host())
}

fn formatter_members(decl: &str) -> Vec<MemberDescriptor> {
    vec![
        MemberDescriptor::method(decl, "format", vec![int()], tag("int")),
        MemberDescriptor::method(decl, "format", vec![long()], tag("long")),
        MemberDescriptor::method(decl, "format", vec![double()], tag("double")),
        MemberDescriptor::method(decl, "format", vec![HostType::Any], tag("object")),
        MemberDescriptor::method(decl, "pick", vec![int(), long()], tag("a")),
        MemberDescriptor::method(decl, "pick", vec![long(), int()], tag("b")),
        MemberDescriptor::method(decl, "join", vec![HostType::Str, HostType::Str], tag("fixed")),
        MemberDescriptor::method(
            decl,
            "join",
            vec![HostType::Str, HostType::array(HostType::Str)],
            |_, args| {
                let sep: String = arg(args, 0)?;
                let parts: Vec<String> = arg(args, 1)?;
                Ok(parts.join(&sep).into_host())
            },
        )
        .varargs(),
        MemberDescriptor::method(decl, "label", vec![HostType::Str], tag("single")),
        MemberDescriptor::method(decl, "label", vec![HostType::array(HostType::Str)], tag("many"))
            .varargs(),
        MemberDescriptor::method(decl, "sum", vec![long(), long()], tag("pair")),
        MemberDescriptor::method(decl, "sum", vec![HostType::array(int())], tag("spread")).varargs(),
        MemberDescriptor::method(decl, "count", vec![HostType::array(HostType::Any)], |_, args| {
            let items: Vec<HostValue> = arg(args, 0)?;
            Ok((items.len() as i32).into_host())
        })
        .varargs(),
    ]
}

/// Registry with people, an overload-heavy formatter, a boolean-like flag
/// and a map-like settings type exposing `get(String)`
pub fn fixture() -> Fixture {
    let registry = Arc::new(TypeRegistry::new());

    let person = RuntimeType::new("app.Person", vec![], TypeCategory::Bean);
    registry.register(person.clone(), person_members("app.Person", &person));

    let employee = RuntimeType::new(
        "app.Employee",
        vec!["app.Person".into()],
        TypeCategory::Bean,
    );
    let mut employee_members = person_members("app.Employee", &employee);
    employee_members.push(MemberDescriptor::method(
        "app.Employee",
        "title",
        vec![],
        |_, _| Ok("engineer".into_host()),
    ));
    registry.register(employee.clone(), employee_members);

    let formatter = RuntimeType::new("util.Formatter", vec![], TypeCategory::Bean);
    registry.register(formatter.clone(), formatter_members("util.Formatter"));

    let flag = registry
        .define("util.Flag")
        .category(TypeCategory::Boolean)
        .method("is_set", vec![], |this, _| {
            Ok(this.and_then(|o| o.downcast_ref::<bool>()).copied().unwrap_or(false).into_host())
        })
        .register();

    let settings = registry
        .define("util.Settings")
        .method("get", vec![HostType::Str], |_, args| {
            let key: String = arg(args, 0)?;
            Ok(format!("value of {}", key).into_host())
        })
        .method("size", vec![], |_, _| Ok(3i32.into_host()))
        .register();

    Fixture {
        registry,
        person,
        employee,
        formatter,
        flag,
        settings,
    }
}

impl Fixture {
    pub fn wrapper(&self) -> ObjectWrapper {
        self.wrapper_with(&BridgeConfig::default())
    }

    pub fn wrapper_with(&self, config: &BridgeConfig) -> ObjectWrapper {
        ObjectWrapper::new(self.registry.clone(), config).expect("valid config")
    }

    pub fn person(&self, name: &str, age: i32) -> HostObject {
        HostObject::new(
            self.person.clone(),
            Person {
                name: name.to_string(),
                age,
            },
        )
    }

    pub fn employee(&self, name: &str) -> HostObject {
        HostObject::new(
            self.employee.clone(),
            Person {
                name: name.to_string(),
                age: 40,
            },
        )
    }

    pub fn formatter(&self) -> HostObject {
        HostObject::new(self.formatter.clone(), ())
    }
}
