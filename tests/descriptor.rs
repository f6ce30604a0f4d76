#![allow(non_snake_case)]

#[cfg(test)]
mod tests {
    use extrude::{ColumnType, DescriptorCache, ExtrudeError, Reflect, Value};
    use std::sync::Arc;
    use time::OffsetDateTime;

    #[derive(Reflect, Default)]
    pub struct Embed {
        pub UpdatedAt: Option<OffsetDateTime>,
        pub CreatedAt: Option<OffsetDateTime>,
    }

    #[derive(Reflect, Default)]
    pub struct Outer {
        #[extrude(id)]
        pub ID: i64,
        pub Name: String,
        #[extrude(embed)]
        embed: Embed,
        #[extrude(column = "-")]
        pub Cached: String,
        #[extrude(skip)]
        pub Scratch: u64,
        hidden: i32,
    }

    #[derive(Reflect, Default)]
    pub struct Renamed {
        #[extrude(id, column = "Key")]
        pub key: String,
        #[extrude(id)]
        pub version: i32,
        #[extrude(length = 16)]
        pub code: String,
        pub payload: Vec<u8>,
        pub tags: Vec<Option<String>>,
        pub ratio: f32,
        pub r#type: bool,
    }

    #[derive(Reflect, Default, Debug, PartialEq)]
    pub struct Blob {
        #[extrude(id)]
        pub ID: i64,
        pub Data: Vec<Box<u8>>,
        pub Shared: Option<Vec<Arc<u8>>>,
    }

    #[derive(Reflect, Default)]
    pub struct KeyPart {
        #[extrude(id)]
        pub Region: String,
        #[extrude(id)]
        pub ID: i64,
    }

    #[derive(Reflect, Default)]
    pub struct Keyed {
        pub Name: String,
        #[extrude(embed)]
        key: Box<KeyPart>,
    }

    #[test]
    fn columns_in_declaration_order() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Outer>().unwrap();
        assert_eq!(descriptor.table(), "Outer");
        assert_eq!(
            descriptor.columns().collect::<Vec<_>>(),
            ["ID", "Name", "UpdatedAt", "CreatedAt"]
        );
        let fields = descriptor.fields();
        assert_eq!(fields[0].path.as_ref(), [0]);
        assert_eq!(fields[1].path.as_ref(), [1]);
        assert_eq!(fields[2].path.as_ref(), [2, 0]);
        assert_eq!(fields[3].path.as_ref(), [2, 1]);
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(field.column_index, i);
        }
        assert!(descriptor.field("Cached").is_none());
        assert!(descriptor.field("Scratch").is_none());
        assert!(descriptor.field("hidden").is_none());
        assert!(descriptor.field("embed").is_none());
    }

    #[test]
    fn column_types() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Outer>().unwrap();
        let id = descriptor.field("ID").unwrap();
        assert_eq!(id.column_type, ColumnType::Int64);
        assert!(id.primary_key);
        assert!(!id.nullable);
        let updated = descriptor.field("UpdatedAt").unwrap();
        assert_eq!(updated.column_type, ColumnType::Timestamp);
        assert!(updated.nullable);
        assert!(!updated.primary_key);

        let descriptor = cache.describe::<Renamed>().unwrap();
        assert_eq!(
            descriptor.columns().collect::<Vec<_>>(),
            ["Key", "version", "code", "payload", "tags", "ratio", "type"]
        );
        assert_eq!(
            descriptor.primary_key().map(|v| v.name).collect::<Vec<_>>(),
            ["Key", "version"]
        );
        let code = descriptor.field("code").unwrap();
        assert_eq!(code.length, 16);
        let payload = descriptor.field("payload").unwrap();
        assert_eq!(payload.column_type, ColumnType::Bytes);
        assert!(!payload.array);
        let tags = descriptor.field("tags").unwrap();
        assert_eq!(tags.column_type, ColumnType::String);
        assert!(tags.array);
        assert!(tags.nullable);
        assert_eq!(
            descriptor.field("ratio").unwrap().column_type,
            ColumnType::Float64
        );
        assert_eq!(
            descriptor.field("type").unwrap().column_type,
            ColumnType::Bool
        );
    }

    #[test]
    fn extract_key() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Outer>().unwrap();
        let outer = Outer {
            ID: 7,
            ..Default::default()
        };
        let key = descriptor.extract_key(&outer).unwrap();
        assert_eq!(key.table(), "Outer");
        assert_eq!(key.parts(), [Value::Int64(Some(7))]);
        assert_eq!(key.to_string(), "Outer(7)");

        let boxed = Box::new(Arc::new(Renamed {
            key: "abc".into(),
            version: 2,
            ..Default::default()
        }));
        let descriptor = cache.describe_of(&boxed).unwrap();
        assert_eq!(descriptor.table(), "Renamed");
        let key = descriptor.extract_key(&boxed).unwrap();
        assert_eq!(
            key.parts(),
            [Value::String(Some("abc".into())), Value::Int64(Some(2))]
        );
    }

    #[test]
    fn extract_key_of_other_type() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Outer>().unwrap();
        let error = descriptor.extract_key(&Renamed::default()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<ExtrudeError>(),
            Some(ExtrudeError::TypeMismatch { .. })
        ));
        assert!(descriptor.extract_key(&5i64).is_err());
    }

    #[test]
    fn pointers_are_transparent() {
        let cache = DescriptorCache::new();
        let plain = cache.describe::<Outer>().unwrap();
        let boxed = cache.describe::<Box<Outer>>().unwrap();
        let shared = cache.describe::<Arc<Box<Outer>>>().unwrap();
        let borrowed = cache.describe::<&Outer>().unwrap();
        assert!(Arc::ptr_eq(&plain, &boxed));
        assert!(Arc::ptr_eq(&plain, &shared));
        assert!(Arc::ptr_eq(&plain, &borrowed));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn pointer_wrapped_bytes() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Blob>().unwrap();
        for name in ["Data", "Shared"] {
            let field = descriptor.field(name).unwrap();
            assert_eq!(field.column_type, ColumnType::Bytes);
            assert!(!field.array);
        }
        let blob = Blob {
            ID: 1,
            Data: vec![Box::new(1), Box::new(2)],
            Shared: None,
        };
        let row = descriptor.row(&blob).unwrap();
        assert_eq!(row[1], Value::Bytes(Some([1, 2].into())));
        assert_eq!(row[2], Value::Bytes(None));
        let copy: Blob = descriptor
            .from_row(&descriptor.row_labeled(&blob).unwrap())
            .unwrap();
        assert_eq!(copy, blob);
    }

    #[test]
    fn primary_key_inside_embedded_record() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Keyed>().unwrap();
        assert_eq!(
            descriptor.columns().collect::<Vec<_>>(),
            ["Name", "Region", "ID"]
        );
        assert_eq!(
            descriptor.primary_key().map(|v| v.name).collect::<Vec<_>>(),
            ["Region", "ID"]
        );
        assert_eq!(descriptor.field("Region").unwrap().path.as_ref(), [1, 0]);
        assert_eq!(descriptor.field("ID").unwrap().path.as_ref(), [1, 1]);
        let keyed = Keyed {
            Name: "north".into(),
            key: Box::new(KeyPart {
                Region: "eu".into(),
                ID: 3,
            }),
        };
        let key = descriptor.extract_key(&keyed).unwrap();
        assert_eq!(
            key.parts(),
            [Value::String(Some("eu".into())), Value::Int64(Some(3))]
        );
        assert_eq!(key.to_string(), "Keyed(\"eu\", 3)");
        assert!(
            descriptor
                .create_table()
                .ends_with(") PRIMARY KEY (Region, ID)")
        );
    }
}
