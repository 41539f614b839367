use std::sync::Once;

use rootio_rbytes::{new_ref, Factory};

use crate::{BaseObject, Named, ObjString};

/// Registers the base classes into `fct`.
pub fn register(fct: &Factory) {
    fct.add("TObject", || new_ref(BaseObject::new()));
    fct.add("TNamed", || new_ref(Named::default()));
    fct.add("TObjString", || new_ref(ObjString::default()));
}

/// Registers the base classes into the process-wide factory. Later calls do
/// nothing.
pub fn register_global() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        tracing::debug!("rbase: registering base classes");
        register(Factory::global());
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register() {
        let fct = Factory::new();
        register(&fct);
        assert_eq!(fct.keys(), vec!["TNamed", "TObjString", "TObject"]);

        let obj = fct.get("TNamed").expect("TNamed")();
        assert_eq!(obj.borrow().class(), "TNamed");
    }

    #[test]
    fn test_register_global_is_idempotent() {
        register_global();
        register_global();
        assert!(Factory::global().has_key("TObjString"));
    }
}
