//! Built-in page served at `/` when the static directory has no `index.html`.

/// Placeholder HTML pointing at the API.
pub fn placeholder_html(max_upload_mb: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Brave Pink</title>
    <style>
        html, body {{
            margin: 0; padding: 0; background: #1B602F;
            font-family: system-ui, -apple-system, sans-serif; color: #F784C5;
        }}
        .center {{ display: flex; align-items: center; justify-content: center;
                   height: 100vh; flex-direction: column; }}
        h1 {{ font-size: 24px; font-weight: 300; margin: 0 0 8px 0; }}
        p {{ font-size: 14px; color: rgba(255,255,255,0.6); margin: 0 0 4px 0; }}
        code {{ color: white; }}
    </style>
</head>
<body>
    <div class="center">
        <h1>Brave Pink</h1>
        <p>POST an image to <code>/api/process</code> as <code>multipart/form-data</code>.</p>
        <p>Uploads up to {max_upload_mb} MB. Put a frontend in <code>STATIC_DIR</code> to replace this page.</p>
    </div>
</body>
</html>"#
    )
}
