#[cfg(test)]
mod tests {
    use rust_decimal::{Decimal, prelude::FromPrimitive};
    use std::{borrow::Cow, sync::Arc};
    use stencil_core::{AsValue, Value};
    use time::Month;
    use uuid::Uuid;

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert!(Value::Null.is_null());
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Int32(Some(0)).is_null());
        assert_eq!(Value::Int32(None), Value::Int32(None));
        assert_ne!(Value::Int32(None), Value::Int64(None));
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(Some(false)));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        let var: bool = AsValue::try_from_value(val).unwrap();
        assert!(var);
        assert!(bool::try_from_value((1 as i8).into()).unwrap());
        assert!(!bool::try_from_value((0 as i32).into()).unwrap());
        assert!(bool::try_from_value((2 as u64).into()).unwrap());
        assert!(bool::try_from_value((0.5 as f32).into()).is_err());
    }

    #[test]
    fn value_integers() {
        let val: Value = (-32768 as i16).into();
        assert_eq!(val, Value::Int16(Some(-32768)));
        assert_ne!(val, Value::Int32(Some(-32768)));
        assert_eq!(i16::try_from_value(val).unwrap(), -32768);
        assert_eq!(i8::try_from_value((99 as u8).into()).unwrap(), 99);
        assert!(i8::try_from_value((300 as i32).into()).is_err());
        assert!(i8::try_from_value((0.1 as f64).into()).is_err());
        assert_eq!(i32::try_from_value((-31 as i8).into()).unwrap(), -31);
        assert_eq!(
            i64::try_from_value((12345678901234 as u64).into()).unwrap(),
            12345678901234
        );
        assert!(u32::try_from_value((-1 as i64).into()).is_err());
        assert_eq!(u64::try_from_value((123456 as u32).into()).unwrap(), 123456);
        assert_eq!(
            u64::try_from_value(Decimal::from(25).into()).unwrap(),
            25,
            "aggregates often come back as decimals"
        );
        assert!(u64::try_from_value(Decimal::from_f64(2.5).unwrap().into()).is_err());
        assert_eq!(i64::try_from_value(" 42 ".into()).unwrap(), 42);
    }

    #[test]
    fn value_floats() {
        let val: Value = 3.14f32.into();
        let var: f32 = AsValue::try_from_value(val).unwrap();
        assert!((var - 3.14).abs() < f32::EPSILON);
        assert_eq!(
            f32::try_from_value(Decimal::from_f64(2.125).into()).unwrap(),
            2.125
        );
        assert_eq!(f64::try_from_value((3.5 as f32).into()).unwrap(), 3.5);
        assert_eq!(f64::try_from_value((7 as i64).into()).unwrap(), 7.0);
    }

    #[test]
    fn value_string() {
        let val: Value = "Hello World!".into();
        assert_eq!(val, Value::Varchar(Some("Hello World!".into())));
        assert_ne!(val, Value::Varchar(Some("Hello World.".into())));
        let var: String = AsValue::try_from_value(val).unwrap();
        assert_eq!(var, "Hello World!");
        assert_eq!(
            String::try_from_value((7205759403792793600 as i64).into()).unwrap(),
            "7205759403792793600"
        );
        assert!(String::try_from_value(Value::Boolean(Some(false))).is_err());
        assert_eq!(char::try_from_value("x".into()).unwrap(), 'x');
        assert!(char::try_from_value("xy".into()).is_err());
    }

    #[test]
    fn value_cow_str() {
        let val: Value = Cow::Borrowed("Hello World!").into();
        assert_eq!(val, Value::Varchar(Some("Hello World!".into())));
        let var: Cow<'_, str> = AsValue::try_from_value(val).unwrap();
        assert_eq!(var, "Hello World!");
        assert!(matches!(
            <Cow<'static, str> as AsValue>::as_empty_value(),
            Value::Varchar(None)
        ));
    }

    #[test]
    fn value_uuid() {
        let id = Uuid::new_v4();
        let val: Value = id.into();
        assert_eq!(val, Value::Uuid(Some(id)));
        assert_eq!(Uuid::try_from_value(val).unwrap(), id);
        let text = id.hyphenated().to_string();
        assert_eq!(Uuid::try_from_value(text.clone().into()).unwrap(), id);
        assert_eq!(String::try_from_value(id.into()).unwrap(), text);
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(id.as_bytes().to_vec().into()))).unwrap(),
            id
        );
        assert!(Uuid::try_from_value("not a uuid".into()).is_err());
    }

    #[test]
    fn value_time() {
        let date = time::Date::from_calendar_date(2025, Month::July, 21).unwrap();
        let val: Value = date.into();
        assert_eq!(val, Value::Date(Some(date)));
        assert_eq!(time::Date::try_from_value(val).unwrap(), date);
        let datetime =
            time::PrimitiveDateTime::new(date, time::Time::from_hms(13, 52, 13).unwrap());
        assert_eq!(
            time::Date::try_from_value(datetime.into()).unwrap(),
            date,
            "timestamps truncate to their date"
        );
        assert_eq!(
            time::OffsetDateTime::try_from_value(datetime.into()).unwrap(),
            datetime.assume_utc()
        );
        assert!(time::Time::try_from_value(date.into()).is_err());
    }

    #[test]
    fn value_wrappers() {
        assert_eq!(Some(5i32).as_value(), Value::Int32(Some(5)));
        assert_eq!(None::<i32>.as_value(), Value::Int32(None));
        assert_eq!(Option::<i32>::try_from_value(Value::Null).unwrap(), None);
        assert_eq!(
            Option::<i32>::try_from_value(Value::Int64(Some(3))).unwrap(),
            Some(3)
        );
        assert_eq!(Box::new(1u8).as_value(), Value::UInt8(Some(1)));
        assert_eq!(
            Arc::<String>::try_from_value("shared".into()).unwrap().as_str(),
            "shared"
        );
    }

    #[test]
    fn value_list() {
        let val = vec![1, 2, 3].as_value();
        assert_eq!(val.as_list().map(|v| v.len()), Some(3));
        assert!(val.same_type(&Vec::<i32>::as_empty_value()));
        assert!(!val.same_type(&Vec::<i64>::as_empty_value()));
        assert_eq!(Vec::<i64>::try_from_value(val.clone()).unwrap(), [1, 2, 3]);
        assert_eq!(<[i32; 3]>::try_from_value(val.clone()).unwrap(), [1, 2, 3]);
        assert!(<[i32; 2]>::try_from_value(val).is_err());
        assert_eq!(format!("{}", [4, 5].as_value()), "[4, 5]");
    }
}
