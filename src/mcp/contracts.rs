use serde_json::json;

pub const TOOL_GENERATE_SLIDESHOW: &str = "pptx.generate_slideshow";

pub fn generate_slideshow_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "templateDir": {
                "type": "string",
                "description": "Directory containing template PPTX files"
            },
            "outputDir": {
                "type": "string",
                "description": "Directory for output PPTX files, created if missing"
            },
            "mediaDir": {
                "type": "string",
                "description": "Directory containing media files; defaults to templateDir"
            },
            "rootTemplate": {
                "type": "string",
                "description": "Root template PPTX filename"
            },
            "templates": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "filename": { "type": "string" },
                        "label": { "type": "string" }
                    },
                    "required": ["filename", "label"]
                }
            },
            "mediaFiles": {
                "type": "array",
                "items": { "type": "string" }
            },
            "slides": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "template": {
                            "type": "string",
                            "description": "Template label or filename"
                        },
                        "slideNumber": { "type": "integer", "minimum": 1 },
                        "textReplacements": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "element": { "type": "string" },
                                    "replacements": {
                                        "type": "array",
                                        "items": {
                                            "type": "object",
                                            "properties": {
                                                "tag": {
                                                    "type": "string",
                                                    "description": "Tag to replace, without {{ }}"
                                                },
                                                "text": { "type": "string" },
                                                "style": text_style_schema()
                                            },
                                            "required": ["tag", "text"]
                                        }
                                    }
                                },
                                "required": ["element", "replacements"]
                            }
                        },
                        "imageReplacements": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "element": { "type": "string" },
                                    "mediaFile": { "type": "string" }
                                },
                                "required": ["element", "mediaFile"]
                            }
                        }
                    },
                    "required": ["template", "slideNumber"]
                }
            },
            "outputFilename": {
                "type": "string",
                "description": "Output PPTX filename"
            },
            "removeExistingSlides": {
                "type": "boolean",
                "default": true
            }
        },
        "required": ["templateDir", "outputDir", "rootTemplate", "slides", "outputFilename"]
    })
}

fn text_style_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "size": {
                "type": "integer",
                "minimum": 0,
                "description": "Font size in hundredths of a point"
            },
            "color": {
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["srgbClr", "schemeClr", "prstClr", "sysClr"]
                    },
                    "value": { "type": "string" }
                },
                "required": ["type", "value"]
            },
            "bold": { "type": "boolean" },
            "italic": { "type": "boolean" }
        },
        "additionalProperties": false
    })
}
