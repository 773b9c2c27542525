// Built-in HTML templates, keyed by the names report nodes ask for.

pub(super) const TEMPLATES: [(&str, &str); 8] = [
    ("base.html", BASE),
    ("dataset.html", DATASET),
    ("column.html", COLUMN),
    ("numeric.html", NUMERIC),
    ("quantile.html", QUANTILE),
    ("dispersion.html", DISPERSION),
    ("temporal.html", TEMPORAL),
    ("text.html", TEXT),
];

const BASE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Profile report</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
section { margin-bottom: 2rem; }
table { border-collapse: collapse; margin: 0.5rem 0; }
th, td { border: 1px solid #ccc; padding: 0.25rem 0.75rem; text-align: left; }
th { background: #f4f4f4; }
.failures { color: #a00; }
</style>
</head>
<body>
<h1>Profile report</h1>
{{ table }}
<h2>Variables</h2>
{{ variables }}
<p class="failures">Failed profilers: {{ failures }}</p>
</body>
</html>
"#;

const DATASET: &str = r#"<section class="dataset">
<h2>Dataset</h2>
<table>
<tr><th>Variables</th><td>{{ variables }}</td></tr>
<tr><th>Observations</th><td>{{ observations }}</td></tr>
<tr><th>Duplicate rows</th><td>{{ duplicates }}</td></tr>
<tr><th>Variable types</th><td>{{ variable_types }}</td></tr>
</table>
</section>
"#;

const COLUMN: &str = r#"<section class="column">
<h3>{{ name }} <small>{{ semantic_type }} ({{ dtype }})</small></h3>
{{ profiles }}
</section>
"#;

const NUMERIC: &str = r#"<table class="numeric">
<tr><th>Distinct</th><td>{{ distinct_count }}</td></tr>
<tr><th>Missing</th><td>{{ null_count }}</td></tr>
<tr><th>Infinite</th><td>{{ infinite }}</td></tr>
<tr><th>Mean</th><td>{{ mean }}</td></tr>
<tr><th>Minimum</th><td>{{ min }}</td></tr>
<tr><th>Maximum</th><td>{{ max }}</td></tr>
<tr><th>Range</th><td>{{ range }}</td></tr>
<tr><th>Zeros</th><td>{{ zeros }}</td></tr>
<tr><th>Negative</th><td>{{ negative }}</td></tr>
</table>
"#;

const QUANTILE: &str = r#"<table class="quantile">
<tr><th>Quantiles</th><td>{{ quantiles }}</td></tr>
<tr><th>Interquartile range</th><td>{{ iqr }}</td></tr>
</table>
"#;

const DISPERSION: &str = r#"<table class="dispersion">
<tr><th>Standard deviation</th><td>{{ std_dev }}</td></tr>
<tr><th>Coefficient of variation</th><td>{{ coefficient_of_variation }}</td></tr>
<tr><th>Kurtosis</th><td>{{ kurtosis }}</td></tr>
<tr><th>Skewness</th><td>{{ skewness }}</td></tr>
</table>
"#;

const TEMPORAL: &str = r#"<table class="temporal">
<tr><th>Distinct</th><td>{{ distinct_count }}</td></tr>
<tr><th>Missing</th><td>{{ null_count }}</td></tr>
<tr><th>Minimum</th><td>{{ min }}</td></tr>
<tr><th>Maximum</th><td>{{ max }}</td></tr>
</table>
"#;

const TEXT: &str = r#"<table class="text">
<tr><th>Distinct</th><td>{{ distinct_count }}</td></tr>
<tr><th>Missing</th><td>{{ null_count }}</td></tr>
<tr><th>Min length</th><td>{{ min_length }}</td></tr>
<tr><th>Median length</th><td>{{ median_length }}</td></tr>
<tr><th>Mean length</th><td>{{ mean_length }}</td></tr>
<tr><th>Max length</th><td>{{ max_length }}</td></tr>
</table>
"#;
