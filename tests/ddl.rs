#![allow(non_snake_case)]

#[cfg(test)]
mod tests {
    use extrude::{DescriptorCache, Reflect, write_create_table};
    use indoc::indoc;
    use time::{Date, OffsetDateTime};

    #[derive(Reflect)]
    pub struct Sample1 {
        #[extrude(id)]
        pub ID: i64,
    }

    #[derive(Reflect)]
    pub struct Audit {
        pub UpdatedAt: OffsetDateTime,
        pub CreatedAt: Option<OffsetDateTime>,
    }

    #[derive(Reflect)]
    pub struct Article {
        #[extrude(id)]
        pub ID: i64,
        #[extrude(id, column = "Lang", length = 8)]
        pub language: String,
        pub Title: String,
        pub Subtitle: Option<String>,
        pub Authors: Vec<Option<String>>,
        pub Scores: Vec<f64>,
        #[extrude(length = 1024)]
        pub Thumbnail: Option<Vec<u8>>,
        pub Published: Date,
        pub Draft: bool,
        #[extrude(embed)]
        pub audit: Box<Audit>,
    }

    #[derive(Reflect)]
    pub struct Reading {
        #[extrude(id)]
        pub Sensor: usize,
        pub Offset: isize,
        pub Scores: [f64; 3],
        pub Flags: Option<[bool; 2]>,
        pub Labels: [Option<String>; 2],
        pub Digest: [u8; 4],
        pub Chunks: Vec<Box<u8>>,
    }

    #[test]
    fn sample1() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Sample1>().unwrap();
        assert_eq!(
            descriptor.create_table(),
            "CREATE TABLE Sample1 (\n\tID\tINT64\tNOT NULL,\n) PRIMARY KEY (ID)"
        );
    }

    #[test]
    fn article() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Article>().unwrap();
        assert_eq!(
            descriptor.create_table(),
            indoc! {"
                CREATE TABLE Article (
                \tID\tINT64\tNOT NULL,
                \tLang\tSTRING(8)\tNOT NULL,
                \tTitle\tSTRING(MAX)\tNOT NULL,
                \tSubtitle\tSTRING(MAX),
                \tAuthors\tARRAY<STRING(MAX)>,
                \tScores\tARRAY<FLOAT64>\tNOT NULL,
                \tThumbnail\tBYTES(1024),
                \tPublished\tDATE\tNOT NULL,
                \tDraft\tBOOL\tNOT NULL,
                \tUpdatedAt\tTIMESTAMP\tNOT NULL,
                \tCreatedAt\tTIMESTAMP,
                ) PRIMARY KEY (ID, Lang)"}
        );
    }

    #[test]
    fn fixed_arrays_and_word_sizes() {
        let cache = DescriptorCache::new();
        let descriptor = cache.describe::<Reading>().unwrap();
        assert_eq!(
            descriptor.create_table(),
            indoc! {"
                CREATE TABLE Reading (
                \tSensor\tINT64\tNOT NULL,
                \tOffset\tINT64\tNOT NULL,
                \tScores\tARRAY<FLOAT64>\tNOT NULL,
                \tFlags\tARRAY<BOOL>,
                \tLabels\tARRAY<STRING(MAX)>,
                \tDigest\tBYTES(MAX)\tNOT NULL,
                \tChunks\tBYTES(MAX)\tNOT NULL,
                ) PRIMARY KEY (Sensor)"}
        );
    }

    #[test]
    fn appends_to_existing_output() {
        let cache = DescriptorCache::new();
        let mut out = String::from("-- schema\n");
        write_create_table(&mut out, &cache.describe::<Audit>().unwrap());
        assert_eq!(
            out,
            indoc! {"
                -- schema
                CREATE TABLE Audit (
                \tUpdatedAt\tTIMESTAMP\tNOT NULL,
                \tCreatedAt\tTIMESTAMP,
                ) PRIMARY KEY ()"}
        );
    }
}
