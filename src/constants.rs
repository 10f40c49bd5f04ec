/// Column names of the member-data source files
pub const FIRST_NAME_COLUMN: &str = "FirstName";
pub const LAST_NAME_COLUMN: &str = "LastName";
pub const COMPANY_COLUMN: &str = "Company";
pub const BIRTH_DATE_COLUMN: &str = "BirthDate";
pub const SALARY_COLUMN: &str = "Salary";
pub const ADDRESS_COLUMN: &str = "Address";
pub const SUBURB_COLUMN: &str = "Suburb";
pub const STATE_COLUMN: &str = "State";
pub const POST_COLUMN: &str = "Post";
pub const PHONE_COLUMN: &str = "Phone";
pub const MOBILE_COLUMN: &str = "Mobile";
pub const EMAIL_COLUMN: &str = "Email";

// Target field names in stored documents
pub const FIRST_NAME_FIELD: &str = "first_name";
pub const LAST_NAME_FIELD: &str = "last_name";
pub const COMPANY_FIELD: &str = "company";
pub const BIRTH_DATE_FIELD: &str = "birth_date";
pub const SALARY_FIELD: &str = "salary";
pub const STREET_FIELD: &str = "street";
pub const SUBURB_FIELD: &str = "suburb";
pub const STATE_FIELD: &str = "state";
pub const POST_FIELD: &str = "post";
pub const PHONE_FIELD: &str = "phone";
pub const MOBILE_FIELD: &str = "mobile";
pub const EMAIL_FIELD: &str = "email";
pub const FULL_NAME_FIELD: &str = "full_name";
pub const AGE_FIELD: &str = "age";
pub const SALARY_BUCKET_FIELD: &str = "salary_bucket";
pub const ADDRESS_FIELD: &str = "address";

/// Suffixes used when a currency field is expanded into two document keys
pub const NUMERIC_SUFFIX: &str = "_numeric";
pub const DISPLAY_SUFFIX: &str = "_display";

pub const CURRENCY_SYMBOL: &str = "$";
pub const CURRENCY_SCALE: u32 = 4;

// Salary bucket bounds (inclusive on both sides for bucket B)
pub const SALARY_BUCKET_LOWER: i64 = 50_000;
pub const SALARY_BUCKET_UPPER: i64 = 100_000;

/// Reference date (year, month, day) used to compute ages
pub const DEFAULT_REFERENCE_DATE: (i32, u32, u32) = (2024, 3, 1);

// Input defaults
pub const DEFAULT_DELIMITER: char = '|';
pub const DEFAULT_QUOTE: char = '"';
pub const DEFAULT_CONFIG_FILE: &str = "etl.toml";

// Sink defaults
pub const DEFAULT_MONGO_URL: &str = "mongodb://mongo:27017/";
pub const DEFAULT_DATABASE: &str = "revenue_db";
pub const DEFAULT_COLLECTION: &str = "member_data";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const APP_NAME: &str = "member_etl";

// Environment variables
pub const ENV_MONGO_URL: &str = "MONGODB_URL";
pub const ENV_MONGO_DATABASE: &str = "MONGODB_DATABASE";
pub const ENV_MONGO_COLLECTION: &str = "MONGODB_COLLECTION";
pub const ENV_MONGO_USERNAME: &str = "MONGODB_ADMIN_USERNAME";
pub const ENV_MONGO_PASSWORD: &str = "MONGODB_ADMIN_PASSWORD";
