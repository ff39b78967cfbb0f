//! PropMap — the properties on a node or link.

use super::{FromPropValue, PropName, PropType, PropValue};
use crate::collections::ValidMap;
use crate::{Error, Result};

/// Property name to value. Rejects the zero name.
pub type PropMap = ValidMap<PropName, PropValue>;

/// Property name to expected kind. Rejects the zero name and `Invalid`.
pub type PropTypeMap = ValidMap<PropName, PropType>;

impl ValidMap<PropName, PropValue> {
    /// Read property `name` as `V`, converting if the stored kind allows it.
    ///
    /// Fails with `PropNotFound` if the property is missing and with
    /// `PropTypeMismatch` if the stored kind neither is nor converts to `V`.
    pub fn get_as<V: FromPropValue>(&self, name: &PropName) -> Result<V> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::PropNotFound(name.to_string()))?;
        let mismatch = || Error::PropTypeMismatch {
            name: name.to_string(),
            got: value.prop_type(),
            want: V::PROP_TYPE,
        };
        if !value.prop_type().is_convertible_to(V::PROP_TYPE) {
            return Err(mismatch());
        }
        V::from_prop_value(value).ok_or_else(mismatch)
    }

    /// Store `value` under `name`.
    pub fn set_prop(&mut self, name: PropName, value: impl Into<PropValue>) -> Result<()> {
        self.set(name, value.into())
    }

    /// Kind of property `name`, or `Invalid` if it is missing.
    pub fn kind_of(&self, name: &PropName) -> PropType {
        self.get(name).map_or(PropType::Invalid, PropValue::prop_type)
    }

    /// The kind of every property.
    pub fn types(&self) -> PropTypeMap {
        PropTypeMap::from_checked(self.iter().map(|(k, v)| (k.clone(), v.prop_type())).collect())
    }
}

impl ValidMap<PropName, PropType> {
    /// Property names with their expected kinds, from `(name, kind)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, PropType)>) -> Result<PropTypeMap> {
        let mut types = PropTypeMap::new();
        for (name, kind) in pairs {
            types.set(PropName::new(name)?, kind)?;
        }
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Complex128, Date};
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> PropName {
        PropName::new(s).unwrap()
    }

    fn g_map() -> PropMap {
        let mut pm = PropMap::new();
        pm.set_prop(name("g"), 'G' as i32).unwrap();
        pm
    }

    #[test]
    fn test_get_as_converts_numbers() {
        let pm = g_map();
        assert_eq!(pm.get_as::<isize>(&name("g")).unwrap(), 71);
        assert_eq!(pm.get_as::<i8>(&name("g")).unwrap(), 71);
        assert_eq!(pm.get_as::<u8>(&name("g")).unwrap(), b'G');
        assert_eq!(pm.get_as::<usize>(&name("g")).unwrap(), 71);
        assert_eq!(pm.get_as::<f32>(&name("g")).unwrap(), 71.0);
        assert_eq!(pm.get_as::<String>(&name("g")).unwrap(), "G");
    }

    #[test]
    fn test_get_as_type_mismatch() {
        let pm = g_map();
        let mismatch = |want| Error::PropTypeMismatch {
            name: "g".into(),
            got: PropType::Int32,
            want,
        };
        assert_eq!(pm.get_as::<bool>(&name("g")), Err(mismatch(PropType::Bool)));
        assert_eq!(pm.get_as::<Complex128>(&name("g")), Err(mismatch(PropType::Complex128)));
        assert_eq!(pm.get_as::<Vec<u8>>(&name("g")), Err(mismatch(PropType::Bytes)));
        assert_eq!(pm.get_as::<DateTime<Utc>>(&name("g")), Err(mismatch(PropType::Time)));
        assert_eq!(pm.get_as::<Date>(&name("g")), Err(mismatch(PropType::Date)));
    }

    #[test]
    fn test_get_as_not_found() {
        let pm = g_map();
        assert_eq!(pm.get_as::<i32>(&name("h")), Err(Error::PropNotFound("h".into())));
        assert_eq!(pm.get_as::<i32>(&PropName::default()), Err(Error::PropNotFound(String::new())));
    }

    #[test]
    fn test_date_time_round_trip() {
        let date = Date::from_ymd(2023, 3, 12);
        let mut pm = PropMap::new();
        pm.set_prop(name("d"), date).unwrap();
        let t: DateTime<Utc> = pm.get_as(&name("d")).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2023, 3, 12, 0, 0, 0).unwrap());

        pm.set_prop(name("t"), t).unwrap();
        assert_eq!(pm.get_as::<Date>(&name("t")).unwrap(), date);
    }

    #[test]
    fn test_set_rejects_zero_name() {
        let mut pm = PropMap::new();
        assert!(matches!(pm.set_prop(PropName::default(), 1i64), Err(Error::InvalidPropName(_))));
        assert!(pm.is_empty());
    }

    #[test]
    fn test_types() {
        let mut pm = g_map();
        pm.set_prop(name("s"), "x").unwrap();
        let types = pm.types();
        assert_eq!(types.get(&name("g")), Some(&PropType::Int32));
        assert_eq!(types.get(&name("s")), Some(&PropType::String));
        assert_eq!(pm.kind_of(&name("missing")), PropType::Invalid);

        let err = PropTypeMap::from_pairs([("x", PropType::Invalid)]).unwrap_err();
        assert_eq!(err, Error::InvalidPropType(PropType::Invalid));
    }
}
