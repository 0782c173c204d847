//! Field policy per request type: inclusion, required-ness and nullability.

use crate::model::{NullSerialization, Nullability, PropertyDescriptor, TypeDescriptor};
use crate::types::RequestType;

/// Whether the property appears at all in a schema for `request`.
pub fn is_property_included(property: &PropertyDescriptor, request: RequestType) -> bool {
    if property.json_ignored && request != RequestType::Parameter {
        return false;
    }
    if property.derived && request != RequestType::Response {
        return false;
    }
    match request {
        RequestType::Create => property.insertable,
        RequestType::Update | RequestType::Patch => property.updatable,
        RequestType::Response | RequestType::Parameter => true,
    }
}

/// Whether the property is listed in `required`.
pub fn is_required(host: &TypeDescriptor, property: &PropertyDescriptor, request: RequestType) -> bool {
    if request.never_required() {
        return false;
    }
    let declared_not_null = !property.nullable.allows_null();
    match request {
        RequestType::Response => {
            declared_not_null
                || property.is_server_computed()
                || property.identifier
                || host.null_serialization == NullSerialization::Always
        }
        _ => declared_not_null && !property.is_server_computed(),
    }
}

/// Whether the field schema carries `nullable: true`.
pub fn is_nullable(host: &TypeDescriptor, property: &PropertyDescriptor, request: RequestType) -> bool {
    let policy_allows_null = host.null_serialization != NullSerialization::Omitted;
    if property.value_type.is_collection() {
        let declared = property.nullable == Nullability::Yes;
        return match request {
            RequestType::Response => declared && policy_allows_null,
            _ => declared,
        };
    }
    match request {
        RequestType::Response => {
            property.nullable.allows_null()
                && !property.embedded_identifier
                && !property.is_server_computed()
                && !property.identifier
                && policy_allows_null
        }
        _ => property.nullable.allows_null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeRef;

    fn host() -> TypeDescriptor {
        TypeDescriptor::entity("Node")
    }

    fn string(name: &str) -> PropertyDescriptor {
        PropertyDescriptor::new(name, TypeRef::named("string"))
    }

    #[test]
    fn response_required() {
        let host = host();
        assert!(is_required(&host, &string("value").not_null(), RequestType::Response));
        assert!(is_required(&host, &string("id").generated(), RequestType::Response));
        assert!(is_required(&host, &string("total").derived(), RequestType::Response));
        assert!(!is_required(
            &host,
            &string("note").nullable(Nullability::Yes),
            RequestType::Response
        ));
    }

    #[test]
    fn always_policy_makes_required_but_nullable() {
        let host = host().null_serialization(NullSerialization::Always);
        let note = string("note").nullable(Nullability::Yes);
        assert!(is_required(&host, &note, RequestType::Response));
        assert!(is_nullable(&host, &note, RequestType::Response));
    }

    #[test]
    fn create_required() {
        let host = host();
        assert!(is_required(&host, &string("value").not_null(), RequestType::Create));
        assert!(!is_required(
            &host,
            &string("id").not_null().generated(),
            RequestType::Create
        ));
        assert!(!is_required(
            &host,
            &string("total").not_null().derived(),
            RequestType::Update
        ));
    }

    #[test]
    fn patch_never_requires() {
        let host = host().null_serialization(NullSerialization::Always);
        for property in [
            string("value").not_null(),
            string("id").generated().id(),
            string("note").nullable(Nullability::Yes),
        ] {
            assert!(!is_required(&host, &property, RequestType::Patch));
        }
    }

    #[test]
    fn response_nullable() {
        let host = host();
        assert!(is_nullable(&host, &string("note"), RequestType::Response));
        assert!(!is_nullable(&host, &string("id").generated(), RequestType::Response));
        assert!(!is_nullable(&host, &string("id").id(), RequestType::Response));
        assert!(!is_nullable(&host, &string("value").not_null(), RequestType::Response));

        let omitted = host.null_serialization(NullSerialization::Omitted);
        assert!(!is_nullable(&omitted, &string("note"), RequestType::Response));
        assert!(is_nullable(&omitted, &string("note"), RequestType::Create));
    }

    #[test]
    fn collections_need_explicit_nullability() {
        let host = host();
        let tags = PropertyDescriptor::new("tags", TypeRef::array(TypeRef::named("string")));
        assert!(!is_nullable(&host, &tags, RequestType::Response));
        assert!(!is_nullable(&host, &tags, RequestType::Create));
        let tags = tags.nullable(Nullability::Yes);
        assert!(is_nullable(&host, &tags, RequestType::Response));
    }

    #[test]
    fn inclusion() {
        let ignored = string("secret").json_ignored();
        assert!(!is_property_included(&ignored, RequestType::Response));
        assert!(is_property_included(&ignored, RequestType::Parameter));

        let read_only = string("createdAt").read_only();
        assert!(is_property_included(&read_only, RequestType::Response));
        assert!(!is_property_included(&read_only, RequestType::Create));
        assert!(!is_property_included(&read_only, RequestType::Patch));

        let derived = string("total").derived();
        assert!(is_property_included(&derived, RequestType::Response));
        assert!(!is_property_included(&derived, RequestType::Update));
    }
}
